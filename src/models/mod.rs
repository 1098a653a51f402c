pub mod ip_range;

pub use ip_range::{CountryIpCount, IpData, IpRange, IpRangeRow, IspIpCount};
