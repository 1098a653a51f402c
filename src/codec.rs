//! Dotted-decimal <-> integer IPv4 conversion
//!
//! Range boundaries in the lookup table are stored as unsigned 32-bit
//! integers, so every address-based query goes through this module first.

use thiserror::Error;

/// Positional weight of each octet, leftmost first (256^3 .. 256^0).
const OCTET_WEIGHTS: [u32; 4] = [1 << 24, 1 << 16, 1 << 8, 1];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid IPv4 address format: {0:?}")]
    InvalidFormat(String),
}

/// Format an integer address as `a.b.c.d`
pub fn decimal_to_string(addr: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        (addr >> 24) & 0xFF,
        (addr >> 16) & 0xFF,
        (addr >> 8) & 0xFF,
        addr & 0xFF
    )
}

/// Parse a dotted-decimal address into its integer form
///
/// Accepts exactly four dot-separated runs of ASCII digits, each in
/// `[0, 255]`. Leading zeros are tolerated (`"010.0.0.1"` is `10.0.0.1`).
pub fn string_to_decimal(ip: &str) -> Result<u32, CodecError> {
    let invalid = || CodecError::InvalidFormat(ip.to_string());

    let mut octets = ip.split('.');
    let mut value: u32 = 0;

    for weight in OCTET_WEIGHTS {
        let segment = octets.next().ok_or_else(invalid)?;
        // u8::from_str accepts a leading '+', which is not valid here
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let octet = segment.parse::<u8>().map_err(|_| invalid())?;
        value += u32::from(octet) * weight;
    }

    if octets.next().is_some() {
        return Err(invalid());
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_to_decimal() {
        assert_eq!(string_to_decimal("127.0.0.1"), Ok(2130706433));
    }

    #[test]
    fn test_decimal_to_string() {
        assert_eq!(decimal_to_string(2130706433), "127.0.0.1");
        assert_eq!(decimal_to_string(0), "0.0.0.0");
        assert_eq!(decimal_to_string(u32::MAX), "255.255.255.255");
        assert_eq!(decimal_to_string(16909060), "1.2.3.4");
    }

    #[test]
    fn test_bounds() {
        assert_eq!(string_to_decimal("0.0.0.0"), Ok(0));
        assert_eq!(string_to_decimal("255.255.255.255"), Ok(u32::MAX));
    }

    #[test]
    fn test_round_trip_canonical() {
        for ip in [
            "1.2.3.4",
            "10.0.0.1",
            "192.168.1.254",
            "8.8.8.8",
            "172.16.254.3",
            "0.255.0.255",
        ] {
            let decimal = string_to_decimal(ip).unwrap();
            assert_eq!(decimal_to_string(decimal), ip);
        }
    }

    #[test]
    fn test_round_trip_every_octet_position() {
        for octet in 0..=255u32 {
            for shift in [0, 8, 16, 24] {
                let addr = octet << shift;
                let text = decimal_to_string(addr);
                assert_eq!(string_to_decimal(&text), Ok(addr), "address {text}");
            }
        }
    }

    #[test]
    fn test_leading_zeros_are_normalized() {
        let decimal = string_to_decimal("010.001.000.009").unwrap();
        assert_eq!(decimal_to_string(decimal), "10.1.0.9");
    }

    #[test]
    fn test_invalid_formats() {
        for ip in [
            "badIP",
            "",
            "1.2.3",
            "1.2.3.4.5",
            "256.0.0.1",
            "1.2.3.-4",
            "1.2.3.+4",
            "1..3.4",
            "1.2.3.4.",
            " 1.2.3.4",
            "1.2.3.4 ",
            "a.b.c.d",
            "1.2.3.1000",
        ] {
            assert_eq!(
                string_to_decimal(ip),
                Err(CodecError::InvalidFormat(ip.to_string())),
                "{ip:?} should be rejected"
            );
        }
    }
}
