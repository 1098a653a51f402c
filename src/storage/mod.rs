pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use trait_def::{is_valid_table_name, RangeStorage, StorageError, StorageResult};

use crate::config::{DatabaseBackend, DatabaseConfig};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Connect to the configured backend and check the range table is readable
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn RangeStorage>> {
    let storage: Arc<dyn RangeStorage> = match config.backend {
        DatabaseBackend::Sqlite => {
            info!("Using SQLite storage: {}", config.url);
            Arc::new(SqliteStorage::new(config).await?)
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL storage (table {})", config.table);
            Arc::new(PostgresStorage::new(config).await?)
        }
    };

    storage.init().await?;
    Ok(storage)
}
