//! Error types for sirius-sap

use thiserror::Error;

use crate::session::SessionId;

/// Result type alias for SoftAP operations
pub type Result<T> = std::result::Result<T, SapError>;

/// Errors returned to callers of the SoftAP controller.
///
/// These are precondition violations and lower-layer command failures.
/// "No channel available" during a start is reported through a
/// notification, not through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SapError {
    /// No session with this id
    #[error("Invalid SAP session {0}")]
    InvalidSession(SessionId),

    /// Operation not permitted in the session's current state
    #[error("Session {session} is busy ({state})")]
    SessionBusy { session: SessionId, state: String },

    /// All session slots are in use
    #[error("Session limit reached ({max})")]
    SessionLimit { max: usize },

    /// Channel number not usable in the current regulatory domain
    #[error("Invalid channel {channel}: {reason}")]
    InvalidChannel { channel: u8, reason: String },

    /// Every candidate channel was eliminated
    #[error("No channel available")]
    NoChannelAvailable,

    /// A compiled-in table is smaller than what the domain needs
    #[error("{table} needs {count} entries, static bound is {max}")]
    TableOverflow {
        table: &'static str,
        count: usize,
        max: usize,
    },

    /// Unknown country code
    #[error("Unknown country code '{0}'")]
    UnknownCountry(String),

    /// Invalid session or controller configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A command to the lower MAC layer failed
    #[error("Lower layer error: {0}")]
    LowerLayer(String),

    /// The runtime task is gone
    #[error("SAP runtime stopped")]
    RuntimeStopped,
}

impl SapError {
    /// Create an invalid session error
    pub fn invalid_session(session: SessionId) -> Self {
        Self::InvalidSession(session)
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a lower layer error
    pub fn lower(msg: impl Into<String>) -> Self {
        Self::LowerLayer(msg.into())
    }

    /// Create an invalid channel error
    pub fn invalid_channel(channel: u8, reason: impl Into<String>) -> Self {
        Self::InvalidChannel {
            channel,
            reason: reason.into(),
        }
    }
}
