//! # Error Handling
//!
//! Error types for Parley Core.
//!
//! Errors fall into four groups that mirror the pipeline stages:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR GROUPS                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                      │
//! │  │                                                                      │
//! │  ├── Host API Errors                                                    │
//! │  │   └── HostRequest          - A host request/response failed          │
//! │  │                                                                      │
//! │  ├── Payload Errors                                                     │
//! │  │   ├── PayloadEncoding      - Payload is not valid base-58            │
//! │  │   ├── PayloadUtf8          - Decoded bytes are not UTF-8             │
//! │  │   └── PayloadStructure     - JSON shape does not match the wire      │
//! │  │                              format                                  │
//! │  │                                                                      │
//! │  ├── Link Errors                                                        │
//! │  │   └── InvalidLink          - Malformed resource-link action          │
//! │  │                                                                      │
//! │  └── Send Errors                                                        │
//! │      └── SendFailed           - Outgoing message was rejected           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Payload errors never escape a refresh cycle: the document decoder
//! converts them into the undecodable sentinel so one malformed message
//! cannot take down its siblings. They exist as typed errors so the decode
//! path can report *why* a payload failed at debug level.

use thiserror::Error;

/// Result type alias for Parley Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Parley Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Host API Errors
    // ========================================================================

    /// A host API request failed
    #[error("Host request failed: {0}")]
    HostRequest(String),

    // ========================================================================
    // Payload Errors
    // ========================================================================

    /// Payload text is not valid base-58
    #[error("Payload is not valid base-58: {0}")]
    PayloadEncoding(String),

    /// Decoded payload bytes are not valid UTF-8
    #[error("Decoded payload is not valid UTF-8")]
    PayloadUtf8,

    /// Payload JSON does not match the wire format
    #[error("Payload structure invalid: {0}")]
    PayloadStructure(String),

    // ========================================================================
    // Link Errors
    // ========================================================================

    /// A resource link carried a malformed action
    #[error("Invalid resource link: {0}")]
    InvalidLink(String),

    // ========================================================================
    // Send Errors
    // ========================================================================

    /// The host rejected an outgoing message
    #[error("Failed to send message: {0}")]
    SendFailed(String),
}

impl Error {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors are transient conditions: the next refresh cycle
    /// or a user retry can resolve them. A malformed payload is not
    /// recoverable: the stored record will never decode differently.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::HostRequest(_) | Error::SendFailed(_))
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::PayloadStructure(err.to_string())
    }
}

impl From<bs58::decode::Error> for Error {
    fn from(err: bs58::decode::Error) -> Self {
        Error::PayloadEncoding(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::PayloadUtf8
    }
}

// ============================================================================
// TESTS
// ============================================================================
