use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::runtime::Runtime;

use crate::config::PgConfig;
use crate::load::{SqlValue, TableData, TableSink, quote_ident};

// Keeps each INSERT well under Postgres' 65535 bind parameter limit.
const INSERT_CHUNK_ROWS: usize = 1000;

/// Blocking facade over an async sqlx pool. Owns a current-thread runtime and
/// blocks on every call, so the pipeline itself stays synchronous.
pub struct PostgresSink {
    // Closed in Drop while the runtime is still alive.
    pool: PgPool,
    runtime: Runtime,
    label: String,
}

impl PostgresSink {
    pub fn connect(cfg: &PgConfig) -> Result<Self> {
        let runtime = new_runtime()?;
        let pool = runtime
            .block_on(
                PgPoolOptions::new()
                    .max_connections(1)
                    .connect_with(connect_options(cfg)),
            )
            .with_context(|| format!("connect to {}", cfg.display_target()))?;
        tracing::info!(target = %cfg.display_target(), "connected to postgres");
        Ok(Self::from_parts(
            runtime,
            pool,
            format!("postgres {}", cfg.display_target()),
        ))
    }

    fn from_parts(runtime: Runtime, pool: PgPool, label: String) -> Self {
        Self {
            pool,
            runtime,
            label,
        }
    }
}

impl Drop for PostgresSink {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl TableSink for PostgresSink {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn replace_table(&mut self, table: &TableData) -> Result<()> {
        self.runtime.block_on(replace_table(&self.pool, table))
    }
}

fn new_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")
}

fn connect_options(cfg: &PgConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.username)
        .password(&cfg.password)
        .database(&cfg.database)
}

async fn replace_table(pool: &PgPool, table: &TableData) -> Result<()> {
    let mut tx = pool.begin().await.context("begin replace transaction")?;

    sqlx::query(&table.drop_statement())
        .execute(&mut *tx)
        .await
        .with_context(|| format!("drop table {}", table.name))?;
    sqlx::query(&table.create_statement())
        .execute(&mut *tx)
        .await
        .with_context(|| format!("create table {}", table.name))?;

    let prefix = format!(
        "INSERT INTO {} ({}) ",
        quote_ident(table.name),
        table.column_list()
    );
    for chunk in table.rows.chunks(INSERT_CHUNK_ROWS) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(&prefix);
        qb.push_values(chunk, |mut b, row| {
            for value in row {
                match value {
                    SqlValue::Integer(v) => b.push_bind(*v),
                    SqlValue::Float(v) => b.push_bind(*v),
                    SqlValue::Text(v) => b.push_bind(v.clone()),
                    SqlValue::Date(v) => b.push_bind(*v),
                };
            }
        });
        qb.build()
            .execute(&mut *tx)
            .await
            .with_context(|| format!("insert into {}", table.name))?;
    }

    tx.commit().await.context("commit replace transaction")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_sink_closes_pool_before_runtime() {
        let runtime = new_runtime().expect("runtime");
        let cfg = PgConfig::new("etl", "secret");
        // Lazy pools never dial out until first use.
        let pool = {
            let _guard = runtime.enter();
            PgPoolOptions::new()
                .max_connections(1)
                .connect_lazy_with(connect_options(&cfg))
        };
        let handle = pool.clone();

        let sink = PostgresSink::from_parts(runtime, pool, "postgres test".to_string());
        assert!(!handle.is_closed());
        drop(sink);
        assert!(handle.is_closed());
    }
}
