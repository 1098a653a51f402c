use crate::models::{IpRange, IspIpCount};
use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no range covers the requested address")]
    NotFound,
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Other(err.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Read-only access to the IP range table
#[async_trait]
pub trait RangeStorage: Send + Sync {
    /// Verify connectivity and that the range table is readable.
    /// Never creates or alters anything.
    async fn init(&self) -> Result<()>;

    /// Cheap round trip used by the health endpoint
    async fn ping(&self) -> Result<()>;

    /// Get the range with `ip_from <= addr <= ip_to`.
    ///
    /// Assumes ranges do not overlap: only the range with the greatest
    /// `ip_from <= addr` is considered, so an address inside a range that
    /// encloses a nested one may be reported as [`StorageError::NotFound`].
    async fn find_by_address(&self, addr: u32) -> StorageResult<IpRange>;

    /// Total addresses allocated to `country_name`; 0 when nothing matches
    async fn sum_ip_count_by_country_name(&self, country_name: &str) -> StorageResult<u64>;

    /// ISPs of `country_code` ranked by allocated addresses, largest first.
    /// Equal counts are ordered by ISP name. Empty when nothing matches.
    async fn top_isp_by_country_code(
        &self,
        country_code: &str,
        limit: u32,
    ) -> StorageResult<Vec<IspIpCount>>;
}

/// Run a storage future under `limit`, mapping expiry to [`StorageError::Timeout`]
pub(crate) async fn with_timeout<T, F>(limit: Duration, fut: F) -> StorageResult<T>
where
    F: Future<Output = StorageResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout(limit)),
    }
}

/// Range table names are interpolated into SQL, so only plain
/// (optionally schema-qualified) identifiers are allowed.
pub fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert!(is_valid_table_name("ip2location"));
        assert!(is_valid_table_name("proxydata.ip2location"));
        assert!(!is_valid_table_name(""));
        assert!(!is_valid_table_name("ip2location; DROP TABLE x"));
        assert!(!is_valid_table_name(".ip2location"));
        assert!(!is_valid_table_name("a..b"));
        assert!(!is_valid_table_name("\"quoted\""));
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result: StorageResult<()> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(StorageError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let result = with_timeout(Duration::from_secs(1), async { Ok(7u64) }).await;
        assert_eq!(result.unwrap(), 7);

        let result: StorageResult<u64> =
            with_timeout(Duration::from_secs(1), async { Err(StorageError::NotFound) }).await;
        assert!(matches!(result, Err(StorageError::NotFound)));
    }
}
