//! Provider-initiated pushes and the signed replies they require.

use serde_json::{Map, Value};

use crate::payload::{kind_of, Payload};
use crate::response::check_version;
use crate::signature::{Signable, SigningParts};
use crate::{Result, TrustlyError, JSONRPC_VERSION};

/// An inbound notification.
///
/// ```text
/// {"method": "...", "params": {"data": {...}, "signature": "...", "uuid": "..."}, "version": "1.1"}
/// ```
#[derive(Debug, Clone)]
pub struct Notification {
    payload: Payload,
    body: Vec<u8>,
}

impl Notification {
    /// Parse a notification body as received from the provider.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(body), fields(len = body.len())))]
    pub fn parse(body: &[u8]) -> Result<Self> {
        let root = match serde_json::from_slice::<Value>(body)? {
            Value::Object(root) => root,
            other => {
                return Err(TrustlyError::data(format!(
                    "expected a JSON object in notification, got {}",
                    kind_of(&other)
                )))
            }
        };
        check_version(root.get("version"))?;
        Ok(Self {
            payload: Payload::from_map(root),
            body: body.to_vec(),
        })
    }

    /// The notification method, e.g. `credit` or `pending`.
    pub fn method(&self) -> Option<&str> {
        self.payload.get("method").and_then(Value::as_str)
    }

    /// The whole `params` mapping.
    pub fn params(&self) -> Option<&Map<String, Value>> {
        self.payload.get("params").and_then(Value::as_object)
    }

    /// Fetch `params.<name>`.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params().and_then(|p| p.get(name))
    }

    /// The notification's correlation id.
    pub fn uuid(&self) -> Option<&str> {
        self.param("uuid").and_then(Value::as_str)
    }

    /// The provider's signature.
    pub fn signature(&self) -> Option<&str> {
        self.param("signature").and_then(Value::as_str)
    }

    /// The `params.data` value.
    pub fn data(&self) -> Option<&Value> {
        self.param("data")
    }

    /// Fetch `params.data.<name>`.
    pub fn data_field(&self, name: &str) -> Option<&Value> {
        self.data().and_then(|d| d.get(name))
    }

    /// The body exactly as received.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Borrow the parsed payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl Signable for Notification {
    fn signing_parts(&self) -> SigningParts<'_> {
        SigningParts {
            method: self.method(),
            uuid: self.uuid(),
            data: self.data(),
            signature: self.signature(),
        }
    }
}

/// The reply a merchant returns for a notification.
///
/// ```text
/// {"result": {"method": "...", "uuid": "...", "signature": "...", "data": {"status": "OK"}}, "version": "1.1"}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationAcknowledgement {
    payload: Payload,
}

impl NotificationAcknowledgement {
    /// Status sent when the notification was processed.
    pub const OK: &'static str = "OK";
    /// Status sent when it was not.
    pub const FAILED: &'static str = "FAILED";

    /// Echo the notification's method and uuid with an OK/FAILED status.
    pub fn new(notification: &Notification, success: bool) -> Self {
        let mut payload = Payload::new();
        {
            let result = payload.object_mut("result");
            if let Some(uuid) = notification.uuid() {
                result.insert("uuid".into(), Value::from(uuid));
            }
            if let Some(method) = notification.method() {
                result.insert("method".into(), Value::from(method));
            }
            let status = if success { Self::OK } else { Self::FAILED };
            let mut data = Map::new();
            data.insert("status".into(), Value::from(status));
            result.insert("data".into(), Value::Object(data));
        }
        payload.set("version", JSONRPC_VERSION);
        Self { payload }
    }

    fn result(&self, name: &str) -> Option<&Value> {
        self.payload.get("result").and_then(|r| r.get(name))
    }

    /// The echoed method.
    pub fn method(&self) -> Option<&str> {
        self.result("method").and_then(Value::as_str)
    }

    /// The echoed correlation id.
    pub fn uuid(&self) -> Option<&str> {
        self.result("uuid").and_then(Value::as_str)
    }

    /// `OK` or `FAILED`.
    pub fn status(&self) -> Option<&str> {
        self.data()
            .and_then(|d| d.get("status"))
            .and_then(Value::as_str)
    }

    /// The `result.data` value.
    pub fn data(&self) -> Option<&Value> {
        self.result("data")
    }

    /// The merchant signature, once set.
    pub fn signature(&self) -> Option<&str> {
        self.result("signature").and_then(Value::as_str)
    }

    /// Store the merchant signature.
    pub fn set_signature(&mut self, signature: impl Into<String>) {
        self.payload
            .object_mut("result")
            .insert("signature".into(), Value::String(signature.into()));
    }

    /// Borrow the underlying payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The serialized reply body.
    pub fn to_json(&self) -> Result<String> {
        self.payload.to_json()
    }
}

impl Signable for NotificationAcknowledgement {
    fn signing_parts(&self) -> SigningParts<'_> {
        SigningParts {
            method: self.method(),
            uuid: self.uuid(),
            data: self.data(),
            signature: self.signature(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::plaintext;
    use serde_json::json;

    const CREDIT: &str = r#"{
        "method": "credit",
        "params": {
            "data": {
                "amount": "902.50",
                "currency": "EUR",
                "messageid": "98348932",
                "orderid": "87654567",
                "enduserid": "32123",
                "notificationid": "9876543456",
                "timestamp": "2010-01-20 14:42:04.675645+01",
                "attributes": {}
            },
            "uuid": "258a2184-2842-b485-25ca-293525152425",
            "signature": "R9+hjuMqbsH0Ku ... S16VbzRsw=="
        },
        "version": "1.1"
    }"#;

    #[test]
    fn test_parse_notification() {
        let notification = Notification::parse(CREDIT.as_bytes()).unwrap();
        assert_eq!(notification.method(), Some("credit"));
        assert_eq!(
            notification.uuid(),
            Some("258a2184-2842-b485-25ca-293525152425")
        );
        assert_eq!(
            notification.data_field("amount"),
            Some(&json!("902.50"))
        );
        assert!(notification.signature().is_some());
        assert_eq!(notification.body(), CREDIT.as_bytes());
    }

    #[test]
    fn test_empty_attributes_stay_in_plaintext() {
        let notification = Notification::parse(CREDIT.as_bytes()).unwrap();
        let text = plaintext(&notification.signing_parts());
        assert!(text.starts_with("credit258a2184-2842-b485-25ca-293525152425amount902.50attributes"));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let err = Notification::parse(b"{truncated").unwrap_err();
        assert!(matches!(err, TrustlyError::Data(_)));

        let err = Notification::parse(b"[]").unwrap_err();
        assert!(matches!(err, TrustlyError::Data(_)));

        let err = Notification::parse(br#"{"method": "credit", "params": {}, "version": "1.0"}"#)
            .unwrap_err();
        assert!(matches!(err, TrustlyError::Version(ref v) if v == "1.0"));
    }

    #[test]
    fn test_acknowledgement_shape() {
        let notification = Notification::parse(CREDIT.as_bytes()).unwrap();

        let ok = NotificationAcknowledgement::new(&notification, true);
        assert_eq!(ok.status(), Some("OK"));
        assert_eq!(ok.method(), Some("credit"));
        assert_eq!(ok.uuid(), notification.uuid());
        assert!(ok.signature().is_none());

        let mut failed = NotificationAcknowledgement::new(&notification, false);
        assert_eq!(failed.status(), Some("FAILED"));
        failed.set_signature("sig");

        let value: Value = serde_json::from_str(&failed.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "result": {
                    "method": "credit",
                    "uuid": "258a2184-2842-b485-25ca-293525152425",
                    "signature": "sig",
                    "data": {"status": "FAILED"}
                },
                "version": "1.1"
            })
        );
    }

    #[test]
    fn test_acknowledgement_plaintext() {
        let notification = Notification::parse(
            br#"{"method": "pending", "params": {"uuid": "u9", "data": {}}, "version": "1.1"}"#,
        )
        .unwrap();
        let ack = NotificationAcknowledgement::new(&notification, true);
        assert_eq!(plaintext(&ack.signing_parts()), "pendingu9statusOK");
    }
}
