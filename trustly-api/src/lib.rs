//! Trustly merchant API clients.
//!
//! Two channels share one [`ApiCore`]:
//!
//! - [`SignedApi`]: every request and reply is RSA-signed (`/api/1`)
//! - [`UnsignedApi`]: the legacy session-token channel (`/api/Legacy`)
//!
//! Networking is delegated to a [`Transport`] and provider keys to a
//! [`PublicKeyStore`](trustly_lib::PublicKeyStore); enable the
//! `http-transport` feature for a blocking HTTPS transport.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trustly_api::{methods::Deposit, ApiConfig, HttpTransport, SignedApi};
//! use trustly_lib::{PemPrivateKey, StaticKeyStore};
//!
//! let api = SignedApi::with_private_key(
//!     ApiConfig::new("merchant", "secret").with_host("test.trustly.com", 443, true),
//!     Arc::new(HttpTransport::new(30)?),
//!     Arc::new(StaticKeyStore::new().with_key("test.trustly.com", provider_pem)),
//!     &PemPrivateKey::new(merchant_pem),
//! )?;
//!
//! let mut deposit = Deposit::new("https://example.com/notify", "user-1", "order-1");
//! deposit.amount = Some("100.00".into());
//! deposit.currency = Some("SEK".into());
//! let response = api.deposit(&deposit)?;
//! let url = response.data_field("url");
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod methods;
pub mod signed;
pub mod transport;
pub mod unsigned;

pub use api::{api_bool, ApiCore, Endpoint};
pub use config::ApiConfig;
pub use methods::MethodCall;
pub use signed::{SignedApi, SIGNED_PATH};
pub use transport::{HttpCall, Transport};
pub use unsigned::{UnsignedApi, LEGACY_PATH};

#[cfg(feature = "http-transport")]
pub use transport::HttpTransport;
