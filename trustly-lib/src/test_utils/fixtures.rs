//! Fixed key material and hosts.

use rsa::pkcs8::{EncodePublicKey, LineEnding};

use crate::signature::{Signer, Verifier};

/// Collection of commonly used test fixtures.
pub struct TestFixtures;

impl TestFixtures {
    /// Merchant private key (PKCS#1).
    pub const MERCHANT_PEM: &'static str = include_str!("keys/merchant.pem");

    /// Private key standing in for the provider (PKCS#1).
    pub const PROVIDER_PEM: &'static str = include_str!("keys/provider.pem");

    /// Host the provider fixtures are registered under.
    pub const TEST_HOST: &'static str = "test.trustly.com";

    /// Merchant API username.
    pub const USERNAME: &'static str = "testusername";

    /// Merchant API password.
    pub const PASSWORD: &'static str = "testpassword";

    /// Signer for the merchant key.
    pub fn merchant_signer() -> Signer {
        Signer::from_pem(Self::MERCHANT_PEM).expect("merchant fixture key is valid")
    }

    /// Signer for the provider key.
    pub fn provider_signer() -> Signer {
        Signer::from_pem(Self::PROVIDER_PEM).expect("provider fixture key is valid")
    }

    /// Verifier for merchant signatures.
    pub fn merchant_verifier() -> Verifier {
        Self::merchant_signer().verifier()
    }

    /// Verifier for provider signatures.
    pub fn provider_verifier() -> Verifier {
        Self::provider_signer().verifier()
    }

    /// SPKI PEM of the merchant public key.
    pub fn merchant_public_pem() -> String {
        public_pem(&Self::merchant_signer())
    }

    /// SPKI PEM of the provider public key.
    pub fn provider_public_pem() -> String {
        public_pem(&Self::provider_signer())
    }
}

fn public_pem(signer: &Signer) -> String {
    signer
        .public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("fixture public key encodes")
}
