//! Error types for Trustly API operations.
//!
//! Every failure of an in-progress call maps onto exactly one
//! [`TrustlyError`] kind. None of them are retried inside the library and a
//! failed signature check is never downgraded to a warning.

use crate::notification::Notification;
use crate::response::JsonRpcResponse;

/// Stable numeric codes for FFI and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum TrustlyErrorCode {
    /// Unsupported JSON-RPC protocol version
    Version = 1000,
    /// Malformed body, correlation mismatch or missing result/error
    Data = 2000,
    /// Transport failure
    Connection = 3000,
    /// Inbound signature verification failed
    Signature = 4000,
    /// Legacy session bootstrap failed
    Authentication = 5000,
    /// Signing attempted without usable key material
    Configuration = 6000,
}

/// The message that failed signature verification.
#[derive(Debug, Clone)]
pub enum Rejected {
    /// A reply to one of our calls.
    Response(JsonRpcResponse),
    /// A provider-initiated push.
    Notification(Notification),
}

/// Error type for Trustly API operations.
#[derive(thiserror::Error, Debug)]
pub enum TrustlyError {
    /// The peer spoke a JSON-RPC version other than `1.1`.
    #[error("JSON RPC version {0} is not supported")]
    Version(String),

    /// Structured input was malformed or unrelated to the request.
    #[error("data error: {0}")]
    Data(String),

    /// The transport failed before a protocol answer was obtained.
    #[error("connection error: {0}")]
    Connection(String),

    /// An inbound message carried a missing or invalid signature.
    #[error("signature error: {message}")]
    Signature {
        /// What failed
        message: String,
        /// The offending message, kept for diagnostics
        rejected: Option<Box<Rejected>>,
    },

    /// The legacy session bootstrap was refused.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Key material or credentials are missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl TrustlyError {
    /// Get the numeric code for this error kind.
    pub fn code(&self) -> TrustlyErrorCode {
        match self {
            Self::Version(_) => TrustlyErrorCode::Version,
            Self::Data(_) => TrustlyErrorCode::Data,
            Self::Connection(_) => TrustlyErrorCode::Connection,
            Self::Signature { .. } => TrustlyErrorCode::Signature,
            Self::Authentication(_) => TrustlyErrorCode::Authentication,
            Self::Configuration(_) => TrustlyErrorCode::Configuration,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// The message that failed verification, if this is a signature error.
    pub fn rejected(&self) -> Option<&Rejected> {
        match self {
            Self::Signature { rejected, .. } => rejected.as_deref(),
            _ => None,
        }
    }

    /// Create a signature error carrying the rejected message.
    pub fn signature(message: impl Into<String>, rejected: Rejected) -> Self {
        Self::Signature {
            message: message.into(),
            rejected: Some(Box::new(rejected)),
        }
    }

    /// Create a data error.
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    /// Create a connection error from any error type.
    pub fn connection<E: std::fmt::Display>(err: E) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for TrustlyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Data(err.to_string())
    }
}
