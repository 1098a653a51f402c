//! Input validation and business rules on top of [`RangeStorage`]

use anyhow::anyhow;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::codec;
use crate::countries::{self, SWITZERLAND};
use crate::models::{IpData, IspIpCount};
use crate::storage::{RangeStorage, StorageError};

/// Result size of the fixed Switzerland ranking
pub const FIXED_TOP_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl LookupError {
    fn from_storage(err: StorageError, what: &str) -> Self {
        match err {
            StorageError::NotFound => LookupError::NotFound(what.to_string()),
            StorageError::Timeout(limit) => {
                LookupError::Internal(anyhow!("{what}: query timed out after {limit:?}"))
            }
            StorageError::Other(e) => LookupError::Internal(e.context(what.to_string())),
        }
    }
}

pub struct LookupService {
    storage: Arc<dyn RangeStorage>,
}

impl LookupService {
    pub fn new(storage: Arc<dyn RangeStorage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn RangeStorage> {
        &self.storage
    }

    /// Range data for a dotted-decimal address
    pub async fn get_data_from_ip(&self, ip: &str) -> Result<IpData, LookupError> {
        let addr = codec::string_to_decimal(ip)
            .map_err(|_| LookupError::BadRequest(format!("invalid ip '{ip}'")))?;

        debug!(ip, addr, "looking up address");

        let range = self
            .storage
            .find_by_address(addr)
            .await
            .map_err(|e| LookupError::from_storage(e, &format!("no data for ip {ip}")))?;

        Ok(IpData::from_range(range, ip))
    }

    /// Number of addresses allocated to a country, by name
    pub async fn get_ip_count_by_country(&self, country_name: &str) -> Result<u64, LookupError> {
        let country = countries::by_name(country_name).ok_or_else(|| {
            LookupError::BadRequest(format!("invalid country_name '{country_name}'"))
        })?;

        self.storage
            .sum_ip_count_by_country_name(country.name)
            .await
            .map_err(|e| {
                LookupError::from_storage(e, &format!("no data for country {}", country.name))
            })
    }

    /// Top `limit` ISPs of a country by allocated addresses
    pub async fn get_top_isp_by_country_code(
        &self,
        country_code: &str,
        limit: u32,
    ) -> Result<Vec<IspIpCount>, LookupError> {
        let country = countries::by_code(country_code).ok_or_else(|| {
            LookupError::BadRequest(format!("invalid country_code '{country_code}'"))
        })?;

        self.storage
            .top_isp_by_country_code(country.code, limit)
            .await
            .map_err(|e| {
                LookupError::from_storage(e, &format!("no ISP data for country {}", country.code))
            })
    }

    /// Top 10 ISPs of Switzerland
    pub async fn get_top_isp_for_switzerland(&self) -> Result<Vec<IspIpCount>, LookupError> {
        self.get_top_isp_by_country_code(SWITZERLAND, FIXED_TOP_LIMIT)
            .await
    }
}
