use std::fmt;
use std::path::PathBuf;

use anyhow::{Result, anyhow};

pub const DB_HOST: &str = "localhost";
pub const DB_PORT: u16 = 5432;
pub const DB_NAME: &str = "Football_ETL";

pub const DEFAULT_INPUT_PATH: &str = "very_messy_football_data_24_25.csv";

pub const ENV_DB_USERNAME: &str = "db_username";
pub const ENV_DB_PASSWORD: &str = "db_password";
pub const ENV_SQLITE_PATH: &str = "FOOTBALL_ETL_SQLITE_PATH";

#[derive(Clone, PartialEq, Eq)]
pub struct PgConfig {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl PgConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: DB_HOST.to_string(),
            port: DB_PORT,
            database: DB_NAME.to_string(),
        }
    }

    /// `user@host:port/db`, safe to log.
    pub fn display_target(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.username, self.host, self.port, self.database
        )
    }
}

impl fmt::Debug for PgConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Postgres(PgConfig),
    Sqlite(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlConfig {
    pub input_path: PathBuf,
    pub destination: Destination,
}

impl EtlConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env(input_path: Option<PathBuf>) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(input_path, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(input_path: Option<PathBuf>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input_path = input_path.unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_PATH));

        let sqlite = lookup(ENV_SQLITE_PATH)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty());
        if let Some(path) = sqlite {
            return Ok(Self {
                input_path,
                destination: Destination::Sqlite(PathBuf::from(path)),
            });
        }

        let username = lookup(ENV_DB_USERNAME)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("missing database username (set {ENV_DB_USERNAME})"))?;
        let password = lookup(ENV_DB_PASSWORD)
            .ok_or_else(|| anyhow!("missing database password (set {ENV_DB_PASSWORD})"))?;

        Ok(Self {
            input_path,
            destination: Destination::Postgres(PgConfig::new(username, password)),
        })
    }
}
