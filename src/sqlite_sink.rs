use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::{Connection, ToSql, params_from_iter};

use crate::load::{SqlValue, TableData, TableSink, quote_ident};

pub struct SqliteSink {
    conn: Connection,
    label: String,
}

impl SqliteSink {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create sqlite dir {}", parent.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        Ok(Self {
            conn,
            label: format!("sqlite {}", path.display()),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        Ok(Self {
            conn,
            label: "sqlite :memory:".to_string(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl TableSink for SqliteSink {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn replace_table(&mut self, table: &TableData) -> Result<()> {
        let tx = self.conn.transaction().context("begin replace transaction")?;
        tx.execute(&table.drop_statement(), [])
            .with_context(|| format!("drop table {}", table.name))?;
        tx.execute(&table.create_statement(), [])
            .with_context(|| format!("create table {}", table.name))?;

        let placeholders = (1..=table.columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            quote_ident(table.name),
            table.column_list()
        );
        {
            let mut stmt = tx
                .prepare(&sql)
                .with_context(|| format!("prepare insert into {}", table.name))?;
            for row in &table.rows {
                stmt.execute(params_from_iter(row.iter()))
                    .with_context(|| format!("insert into {}", table.name))?;
            }
        }
        tx.commit().context("commit replace transaction")?;
        Ok(())
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            SqlValue::Integer(Some(n)) => Value::Integer(*n),
            SqlValue::Float(Some(f)) => Value::Real(*f),
            SqlValue::Text(Some(s)) => return Ok(ToSqlOutput::from(s.as_str())),
            // ISO-8601 text, SQLite's conventional date storage.
            SqlValue::Date(Some(d)) => Value::Text(d.format("%Y-%m-%d").to_string()),
            SqlValue::Integer(None)
            | SqlValue::Float(None)
            | SqlValue::Text(None)
            | SqlValue::Date(None) => Value::Null,
        };
        Ok(ToSqlOutput::Owned(value))
    }
}
