//! Error types for sirius-csr

use thiserror::Error;

/// Result type alias for CSR operations
pub type Result<T> = std::result::Result<T, CsrError>;

/// Errors raised while decoding security elements or scan descriptors.
///
/// A BSS that simply does not satisfy a filter is not an error: matching
/// and negotiation report that through `Option`/`bool`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsrError {
    /// An information element could not be decoded
    #[error("Failed to parse {what}: {reason}")]
    ParseError { what: String, reason: String },

    /// Invalid MAC address
    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),

    /// Invalid SSID (longer than 32 octets)
    #[error("Invalid SSID: {0}")]
    InvalidSsid(String),

    /// A suite selector that has no place in the lookup tables
    #[error("Unknown suite selector {0:02X?}")]
    UnknownSuite([u8; 4]),
}

impl CsrError {
    /// Create a parse error for the named element
    pub fn parse(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseError {
            what: what.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid MAC address error
    pub fn invalid_mac(msg: impl Into<String>) -> Self {
        Self::InvalidMac(msg.into())
    }

    /// Check if this is a decoding failure (as opposed to a bad argument)
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::ParseError { .. })
    }
}
