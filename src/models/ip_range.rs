use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::codec::decimal_to_string;

/// Raw row of the range table, as stored.
///
/// Bounds are kept as `i64` because neither backend has an unsigned 32-bit
/// column type; [`IpRange`] narrows them.
#[derive(Debug, Clone, FromRow)]
pub struct IpRangeRow {
    pub ip_from: i64,
    pub ip_to: i64,
    pub proxy_type: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub region_name: Option<String>,
    pub city_name: Option<String>,
    pub isp: Option<String>,
}

/// One inclusive IPv4 interval and its geolocation/ISP metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRange {
    pub ip_from: u32,
    pub ip_to: u32,
    pub proxy_type: String,
    pub country_code: String,
    pub country_name: String,
    pub region_name: String,
    pub city_name: String,
    pub isp: String,
}

impl IpRange {
    /// Number of addresses covered by this range (bounds inclusive)
    pub fn ip_count(&self) -> u64 {
        u64::from(self.ip_to) - u64::from(self.ip_from) + 1
    }

    pub fn contains(&self, addr: u32) -> bool {
        self.ip_from <= addr && addr <= self.ip_to
    }
}

impl TryFrom<IpRangeRow> for IpRange {
    type Error = anyhow::Error;

    fn try_from(row: IpRangeRow) -> Result<Self, Self::Error> {
        let ip_from = u32::try_from(row.ip_from)
            .with_context(|| format!("ip_from {} is not a valid IPv4 address", row.ip_from))?;
        let ip_to = u32::try_from(row.ip_to)
            .with_context(|| format!("ip_to {} is not a valid IPv4 address", row.ip_to))?;

        Ok(Self {
            ip_from,
            ip_to,
            proxy_type: row.proxy_type.unwrap_or_default(),
            country_code: row.country_code.unwrap_or_default(),
            country_name: row.country_name.unwrap_or_default(),
            region_name: row.region_name.unwrap_or_default(),
            city_name: row.city_name.unwrap_or_default(),
            isp: row.isp.unwrap_or_default(),
        })
    }
}

/// Response record for a single-address lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpData {
    pub ip_from: u32,
    pub ip_to: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip_from_string: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip_to_string: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub proxy_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub isp: String,
    /// The address exactly as the caller supplied it
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip_string: String,
}

impl IpData {
    pub fn from_range(range: IpRange, ip_string: impl Into<String>) -> Self {
        Self {
            ip_from: range.ip_from,
            ip_to: range.ip_to,
            ip_from_string: decimal_to_string(range.ip_from),
            ip_to_string: decimal_to_string(range.ip_to),
            proxy_type: range.proxy_type,
            country_code: range.country_code,
            country_name: range.country_name,
            region_name: range.region_name,
            city_name: range.city_name,
            isp: range.isp,
            ip_string: ip_string.into(),
        }
    }
}

/// Total addresses held by one ISP within a filter scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IspIpCount {
    pub isp: String,
    pub ip_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryIpCount {
    pub country_name: String,
    pub ip_count: u64,
    pub elapsed_time_in_millis: u64,
}
