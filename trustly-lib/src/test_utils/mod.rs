//! Test utilities for Trustly clients.
//!
//! - Fixed RSA key pairs for the merchant and the provider side
//! - A [`MockProvider`] that produces correctly signed replies and
//!   notifications, as the real provider would
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trustly_lib::test_utils::{MockProvider, TestFixtures};
//!
//! let provider = MockProvider::new();
//! let body = provider.result("Deposit", "uuid-1", json!({"orderid": "1"}));
//! let verifier = TestFixtures::provider_verifier();
//! ```

mod fixtures;
mod provider;

pub use fixtures::TestFixtures;
pub use provider::MockProvider;
