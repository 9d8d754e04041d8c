//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use trustly_lib::prelude::*;
//! ```

// Message model
pub use crate::{JsonRpcRequest, JsonRpcResponse, Notification, NotificationAcknowledgement};
pub use crate::{ErrorShape, Payload, RawResponse};

// Error handling
pub use crate::errors::{TrustlyError, TrustlyErrorCode};
pub use crate::Result;

// Signatures and keys
pub use crate::keys::{PrivateKeyStore, PublicKeyStore};
pub use crate::signature::{Signable, Signer, Verifier};
