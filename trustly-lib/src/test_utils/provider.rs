//! Signed provider replies for tests.

use serde_json::{json, Value};

use crate::signature::{plaintext, Signer, SigningParts};
use crate::test_utils::TestFixtures;

/// Produces reply and notification bodies signed with the provider key.
#[derive(Debug, Clone)]
pub struct MockProvider {
    signer: Signer,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// A provider signing with [`TestFixtures::PROVIDER_PEM`].
    pub fn new() -> Self {
        Self::with_signer(TestFixtures::provider_signer())
    }

    /// A provider signing with an arbitrary key.
    pub fn with_signer(signer: Signer) -> Self {
        Self { signer }
    }

    /// The signing key in use.
    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Signature over `method ++ uuid ++ canonical(data)`.
    pub fn sign(&self, method: &str, uuid: &str, data: &Value) -> String {
        let text = plaintext(&SigningParts {
            method: Some(method),
            uuid: Some(uuid),
            data: Some(data),
            signature: None,
        });
        self.signer.sign(&text).expect("fixture key signs")
    }

    /// A signed success reply.
    pub fn result(&self, method: &str, uuid: &str, data: Value) -> String {
        let signature = self.sign(method, uuid, &data);
        json!({
            "version": "1.1",
            "result": {
                "signature": signature,
                "method": method,
                "data": data,
                "uuid": uuid
            }
        })
        .to_string()
    }

    /// A signed error reply in the nested layout.
    pub fn error(&self, method: &str, uuid: &str, code: i64, message: &str) -> String {
        let data = json!({"code": code, "message": message});
        let signature = self.sign(method, uuid, &data);
        json!({
            "version": "1.1",
            "error": {
                "error": {
                    "signature": signature,
                    "data": data,
                    "method": method,
                    "uuid": uuid
                },
                "name": "JSONRPCError",
                "code": code,
                "message": message
            }
        })
        .to_string()
    }

    /// An unsigned legacy success reply.
    pub fn legacy_result(&self, result: Value) -> String {
        json!({"version": "1.1", "result": result}).to_string()
    }

    /// An unsigned error reply in the flat layout.
    pub fn flat_error(&self, code: i64, message: &str) -> String {
        json!({
            "version": "1.1",
            "error": {"name": "JSONRPCError", "code": code, "message": message}
        })
        .to_string()
    }

    /// A signed notification.
    pub fn notification(&self, method: &str, uuid: &str, data: Value) -> String {
        let signature = self.sign(method, uuid, &data);
        json!({
            "method": method,
            "params": {
                "data": data,
                "signature": signature,
                "uuid": uuid
            },
            "version": "1.1"
        })
        .to_string()
    }
}
