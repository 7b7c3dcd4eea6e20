//! 48-bit hardware addresses as they appear in BSS descriptors and filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CsrError, Result};

/// MAC address (6 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Broadcast address (FF:FF:FF:FF:FF:FF)
    pub const BROADCAST: MacAddress = MacAddress([0xFF; 6]);

    /// Zero/null address
    pub const ZERO: MacAddress = MacAddress([0x00; 6]);

    /// Create from bytes
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Create from slice (must be 6 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; 6] = slice.try_into().map_err(|_| {
            CsrError::invalid_mac(format!("Expected 6 bytes, got {}", slice.len()))
        })?;
        Ok(Self(bytes))
    }

    /// Get as byte slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xFF; 6]
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0x00; 6]
    }

    /// Check if this is a multicast address (bit 0 of first octet set)
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// Zero and broadcast both stand for "any BSSID" in a scan filter.
    pub fn is_wildcard(&self) -> bool {
        self.is_zero() || self.is_broadcast()
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({})", self)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddress {
    type Err = CsrError;

    /// Accepts `aa:bb:cc:dd:ee:ff` and `aa-bb-cc-dd-ee-ff`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(|c| c == ':' || c == '-').collect();
        if parts.len() != 6 {
            return Err(CsrError::invalid_mac(format!(
                "Expected 6 octets, got {}",
                parts.len()
            )));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = u8::from_str_radix(part, 16)
                .map_err(|_| CsrError::invalid_mac(format!("Invalid octet '{}'", part)))?;
        }
        Ok(Self(bytes))
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_parse_and_display() {
        let mac: MacAddress = "00:11:22:aa:BB:cc".parse().unwrap();
        assert_eq!(mac.0, [0x00, 0x11, 0x22, 0xAA, 0xBB, 0xCC]);
        assert_eq!(mac.to_string(), "00:11:22:AA:BB:CC");

        let dashed: MacAddress = "00-11-22-AA-BB-CC".parse().unwrap();
        assert_eq!(mac, dashed);
    }

    #[test]
    fn test_mac_rejects_garbage() {
        assert!("00:11:22".parse::<MacAddress>().is_err());
        assert!("00:11:22:33:44:zz".parse::<MacAddress>().is_err());
        assert!(MacAddress::from_slice(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_wildcards() {
        assert!(MacAddress::ZERO.is_wildcard());
        assert!(MacAddress::BROADCAST.is_wildcard());
        assert!(MacAddress::BROADCAST.is_multicast());
        assert!(!MacAddress::new([0x02, 0, 0, 0, 0, 1]).is_wildcard());
    }
}
