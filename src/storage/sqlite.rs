use crate::config::DatabaseConfig;
use crate::models::{IpRange, IpRangeRow, IspIpCount};
use crate::storage::trait_def::with_timeout;
use crate::storage::{RangeStorage, StorageError, StorageResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
    table: String,
    query_timeout: Duration,
}

impl SqliteStorage {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.url)
            .await
            .with_context(|| format!("Failed to connect to SQLite database at {}", config.url))?;
        Ok(Self {
            pool: Arc::new(pool),
            table: config.table.clone(),
            query_timeout: config.query_timeout(),
        })
    }

    /// Underlying pool, for loading reference data from outside the service
    pub fn pool(&self) -> &SqlitePool {
        self.pool.as_ref()
    }
}

#[async_trait]
impl RangeStorage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        // The range table is reference data loaded elsewhere; only check it is readable
        sqlx::query(&format!("SELECT 1 FROM {} LIMIT 0", self.table))
            .execute(self.pool.as_ref())
            .await
            .with_context(|| format!("Range table {} is missing or unreadable", self.table))?;

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        with_timeout(self.query_timeout, async {
            sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
            Ok::<_, StorageError>(())
        })
        .await
        .context("SQLite ping failed")
    }

    async fn find_by_address(&self, addr: u32) -> StorageResult<IpRange> {
        // Ranges don't overlap: the candidate is the one with the greatest
        // lower bound not above addr, which the ip_from index answers directly.
        let row = with_timeout(self.query_timeout, async {
            let row = sqlx::query_as::<_, IpRangeRow>(&format!(
                r#"
                SELECT ip_from, ip_to, proxy_type, country_code, country_name,
                       region_name, city_name, isp
                FROM {}
                WHERE ip_from <= ?
                ORDER BY ip_from DESC
                LIMIT 1
                "#,
                self.table
            ))
            .bind(i64::from(addr))
            .fetch_optional(self.pool.as_ref())
            .await?;
            Ok::<_, StorageError>(row)
        })
        .await?;

        let range = IpRange::try_from(row.ok_or(StorageError::NotFound)?)?;
        if !range.contains(addr) {
            return Err(StorageError::NotFound);
        }
        Ok(range)
    }

    async fn sum_ip_count_by_country_name(&self, country_name: &str) -> StorageResult<u64> {
        let sum = with_timeout(self.query_timeout, async {
            let sum = sqlx::query_scalar::<_, Option<i64>>(&format!(
                r#"
                SELECT SUM(ip_to - ip_from + 1)
                FROM {}
                WHERE country_name = ?
                "#,
                self.table
            ))
            .bind(country_name)
            .fetch_one(self.pool.as_ref())
            .await?;
            Ok::<_, StorageError>(sum)
        })
        .await?;

        let sum = sum.unwrap_or(0);
        let sum = u64::try_from(sum)
            .with_context(|| format!("negative address count {sum} for {country_name}"))?;
        Ok(sum)
    }

    async fn top_isp_by_country_code(
        &self,
        country_code: &str,
        limit: u32,
    ) -> StorageResult<Vec<IspIpCount>> {
        let rows = with_timeout(self.query_timeout, async {
            let rows = sqlx::query_as::<_, (Option<String>, i64)>(&format!(
                r#"
                SELECT isp, SUM(ip_to - ip_from + 1) AS ip_count
                FROM {}
                WHERE country_code = ?
                GROUP BY isp
                ORDER BY ip_count DESC, isp ASC
                LIMIT ?
                "#,
                self.table
            ))
            .bind(country_code)
            .bind(i64::from(limit))
            .fetch_all(self.pool.as_ref())
            .await?;
            Ok::<_, StorageError>(rows)
        })
        .await?;

        rows.into_iter()
            .map(|(isp, ip_count)| {
                let ip_count = u64::try_from(ip_count)
                    .with_context(|| format!("negative address count {ip_count}"))?;
                Ok::<_, StorageError>(IspIpCount {
                    isp: isp.unwrap_or_default(),
                    ip_count,
                })
            })
            .collect()
    }
}
