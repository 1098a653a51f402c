use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::storage::is_valid_table_name;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
    /// Range table, optionally schema-qualified
    pub table: String,
    pub acquire_timeout_secs: u64,
    pub query_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str = env_or("DATABASE_BACKEND", "sqlite");

        let backend = match backend_str.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            "sqlite" => DatabaseBackend::Sqlite,
            other => {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{other}', falling back to 'sqlite'. Supported values: sqlite, postgres"
                );
                DatabaseBackend::Sqlite
            }
        };

        let database_url = env_or("DATABASE_URL", "sqlite://./ipdata.db");

        let max_connections = env_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;
        if max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        let table = env_or("DATABASE_TABLE", "ip2location");
        if !is_valid_table_name(&table) {
            bail!("DATABASE_TABLE '{table}' is not a plain table name");
        }

        let acquire_timeout_secs = env_or("DATABASE_ACQUIRE_TIMEOUT_SECS", "5")
            .parse::<u64>()
            .context("DATABASE_ACQUIRE_TIMEOUT_SECS must be a number of seconds")?;

        let query_timeout_secs = env_or("QUERY_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .context("QUERY_TIMEOUT_SECS must be a number of seconds")?;

        let api_host = env_or("API_HOST", "127.0.0.1");
        let api_port = env_or("API_PORT", "8000")
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
                table,
                acquire_timeout_secs,
                query_timeout_secs,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
        })
    }
}
