//! Trustly protocol library.
//!
//! Message model and cryptography for the Trustly merchant JSON-RPC protocol.
//! Network access and key loading are delegated to callers through the
//! collaborator traits in [`keys`]; the `trustly-api` crate builds the clients
//! on top of this.
//!
//! # Features
//!
//! - **Canonical Serialization**: Deterministic flattening of value trees for signing
//! - **Signatures**: RSA PKCS#1 v1.5 over SHA-1, base64 on the wire
//! - **Message Model**: Requests, responses, notifications and acknowledgements
//!   over one null-pruning [`Payload`]
//!
//! # Example
//!
//! ```ignore
//! use serde_json::json;
//! use trustly_lib::{JsonRpcRequest, Signer, Signable};
//!
//! let signer = Signer::from_pem(&pem)?;
//! let mut request = JsonRpcRequest::new("Void", Some(json!({"OrderID": "1"})), None)?;
//! request.set_uuid(trustly_lib::new_uuid());
//! let signature = signer.sign_message(&request)?;
//! request.set_param("Signature", signature);
//! ```

pub mod canonical;
pub mod errors;
pub mod keys;
pub mod notification;
pub mod payload;
pub mod prelude;
pub mod request;
pub mod response;
pub mod signature;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use errors::{Rejected, TrustlyError, TrustlyErrorCode};
pub use keys::{PemPrivateKey, PrivateKeyStore, PublicKeyStore, StaticKeyStore};
pub use notification::{Notification, NotificationAcknowledgement};
pub use payload::{vacuum, Payload};
pub use request::JsonRpcRequest;
pub use response::{ErrorShape, JsonRpcResponse, RawResponse};
pub use signature::{new_uuid, plaintext, Signable, Signer, SigningParts, Verifier};

/// Convenience alias for Trustly results.
pub type Result<T> = std::result::Result<T, TrustlyError>;

/// The only JSON-RPC version the protocol speaks.
pub const JSONRPC_VERSION: &str = "1.1";
