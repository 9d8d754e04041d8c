//! Key material collaborators.
//!
//! Loading keys from files or configuration stores is left to the embedding
//! application; the client only needs these two lookups.

use std::collections::HashMap;

use crate::signature::{Signer, Verifier};
use crate::{Result, TrustlyError};

/// Resolves the provider public key for a host.
pub trait PublicKeyStore: Send + Sync {
    /// Return the PEM registered under `name`, if any.
    fn lookup(&self, name: &str) -> Option<String>;

    /// Resolve the key for `host:port`, falling back to `host`.
    fn resolve(&self, host: &str, port: u16) -> Result<Verifier> {
        let pem = self
            .lookup(&format!("{}:{}", host, port))
            .or_else(|| self.lookup(host))
            .ok_or_else(|| {
                TrustlyError::Configuration(format!(
                    "no provider public key for {}:{}",
                    host, port
                ))
            })?;
        Verifier::from_pem(&pem)
    }
}

/// Supplies the merchant private key.
pub trait PrivateKeyStore: Send + Sync {
    /// Return the merchant key as PEM (PKCS#1 or PKCS#8).
    fn private_key_pem(&self) -> Result<String>;

    /// Decode the key into a signer.
    fn load_signer(&self) -> Result<Signer> {
        Signer::from_pem(&self.private_key_pem()?)
    }
}

/// In-memory public key store keyed by `host` or `host:port`.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyStore {
    keys: HashMap<String, String>,
}

impl StaticKeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a PEM under `name`.
    pub fn with_key(mut self, name: impl Into<String>, pem: impl Into<String>) -> Self {
        self.insert(name, pem);
        self
    }

    /// Register or replace a PEM under `name`.
    pub fn insert(&mut self, name: impl Into<String>, pem: impl Into<String>) {
        self.keys.insert(name.into(), pem.into());
    }
}

impl PublicKeyStore for StaticKeyStore {
    fn lookup(&self, name: &str) -> Option<String> {
        self.keys.get(name).cloned()
    }
}

/// A merchant private key held in memory as PEM.
#[derive(Clone)]
pub struct PemPrivateKey(String);

impl PemPrivateKey {
    /// Wrap a PEM string.
    pub fn new(pem: impl Into<String>) -> Self {
        Self(pem.into())
    }
}

impl std::fmt::Debug for PemPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PemPrivateKey(..)")
    }
}

impl PrivateKeyStore for PemPrivateKey {
    fn private_key_pem(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
