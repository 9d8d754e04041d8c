//! # RSA Signature Engine
//!
//! ## Security Model
//!
//! Every signed message is reduced to a plaintext
//!
//! ```text
//! method ++ uuid ++ canonical(data)
//! ```
//!
//! where a missing method or uuid contributes the empty string. The plaintext
//! is hashed with SHA-1 as UTF-8 and signed with PKCS#1 v1.5 padding; the
//! signature travels base64-encoded.
//!
//! - Merchant requests and notification acknowledgements are signed with the
//!   merchant private key ([`Signer`])
//! - Provider replies and notifications are verified with the provider public
//!   key ([`Verifier`])
//! - Verification only ever answers yes or no. Malformed, absent and
//!   mismatching signatures are all a plain `false`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs1v15::{Signature as RsaSignature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{SignatureEncoding, Signer as _, Verifier as _};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::Value;
use sha1::Sha1;

use crate::canonical;
use crate::{Result, TrustlyError};

/// The fields of a message that take part in its signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigningParts<'a> {
    /// RPC method name
    pub method: Option<&'a str>,
    /// Correlation id
    pub uuid: Option<&'a str>,
    /// The inner data mapping
    pub data: Option<&'a Value>,
    /// Base64 signature carried by the message, if any
    pub signature: Option<&'a str>,
}

/// Anything that can be signed or verified as a protocol message.
pub trait Signable {
    /// Borrow the signed fields of this message.
    fn signing_parts(&self) -> SigningParts<'_>;
}

/// Build the signing plaintext for a message.
pub fn plaintext(parts: &SigningParts<'_>) -> String {
    let mut text = String::new();
    text.push_str(parts.method.unwrap_or_default());
    text.push_str(parts.uuid.unwrap_or_default());
    if let Some(data) = parts.data {
        text.push_str(&canonical::serialize(data));
    }
    text
}

/// Merchant-side signer holding an RSA private key.
#[derive(Clone)]
pub struct Signer {
    key: SigningKey<Sha1>,
    public: RsaPublicKey,
}

impl Signer {
    /// Load a signer from PEM (PKCS#1 `RSA PRIVATE KEY` or PKCS#8 `PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<Self> {
        let key = if pem.contains("BEGIN RSA PRIVATE KEY") {
            RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| {
                TrustlyError::Configuration(format!("invalid PKCS#1 private key: {}", e))
            })?
        } else {
            RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| {
                TrustlyError::Configuration(format!("invalid PKCS#8 private key: {}", e))
            })?
        };
        Ok(Self::from_private_key(key))
    }

    /// Wrap an already decoded private key.
    pub fn from_private_key(key: RsaPrivateKey) -> Self {
        let public = key.to_public_key();
        Self {
            key: SigningKey::<Sha1>::new(key),
            public,
        }
    }

    /// Sign a plaintext and return the base64 signature.
    pub fn sign(&self, plaintext: &str) -> Result<String> {
        let signature: RsaSignature = self
            .key
            .try_sign(plaintext.as_bytes())
            .map_err(|e| TrustlyError::Configuration(format!("signing failed: {}", e)))?;
        Ok(STANDARD.encode(signature.to_bytes()))
    }

    /// Sign the plaintext derived from a message.
    pub fn sign_message<M: Signable + ?Sized>(&self, message: &M) -> Result<String> {
        self.sign(&plaintext(&message.signing_parts()))
    }

    /// The matching public key.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// A verifier for signatures produced by this signer.
    pub fn verifier(&self) -> Verifier {
        Verifier::from_public_key(self.public.clone())
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

/// Provider-side verifier holding an RSA public key.
#[derive(Clone)]
pub struct Verifier {
    key: VerifyingKey<Sha1>,
}

impl Verifier {
    /// Load a verifier from PEM (SPKI `PUBLIC KEY` or PKCS#1 `RSA PUBLIC KEY`).
    pub fn from_pem(pem: &str) -> Result<Self> {
        let key = if pem.contains("BEGIN RSA PUBLIC KEY") {
            RsaPublicKey::from_pkcs1_pem(pem)
                .map_err(|e| TrustlyError::Configuration(format!("invalid public key: {}", e)))?
        } else {
            RsaPublicKey::from_public_key_pem(pem)
                .map_err(|e| TrustlyError::Configuration(format!("invalid public key: {}", e)))?
        };
        Ok(Self::from_public_key(key))
    }

    /// Wrap an already decoded public key.
    pub fn from_public_key(key: RsaPublicKey) -> Self {
        Self {
            key: VerifyingKey::<Sha1>::new(key),
        }
    }

    /// Check a base64 signature over a plaintext.
    pub fn verify(&self, plaintext: &str, signature_b64: &str) -> bool {
        let Ok(raw) = STANDARD.decode(signature_b64.trim()) else {
            return false;
        };
        let Ok(signature) = RsaSignature::try_from(raw.as_slice()) else {
            return false;
        };
        self.key.verify(plaintext.as_bytes(), &signature).is_ok()
    }

    /// Check the signature a message carries against its own fields.
    pub fn verify_message<M: Signable + ?Sized>(&self, message: &M) -> bool {
        let parts = message.signing_parts();
        match parts.signature {
            Some(signature) => self.verify(&plaintext(&parts), signature),
            None => false,
        }
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier").finish_non_exhaustive()
    }
}

/// Generate a fresh correlation id.
pub fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}
