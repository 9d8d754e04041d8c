//! Outbound JSON-RPC requests.
//!
//! ```text
//! {"method": "...",
//!  "params": {"UUID": "...", "Data": {..., "Attributes": {...}}, "Signature": "..."},
//!  "version": "1.1"}
//! ```

use serde_json::{Map, Value};

use crate::payload::{kind_of, Payload};
use crate::signature::{Signable, SigningParts};
use crate::{Result, TrustlyError, JSONRPC_VERSION};

/// A request to the provider.
///
/// Built per call and mutated only before dispatch; the client writes
/// `params.Signature` last, after credentials have been injected.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonRpcRequest {
    payload: Payload,
}

impl JsonRpcRequest {
    /// Create a request with optional data and attributes.
    ///
    /// Data and attributes are vacuumed, so absent optional fields never reach
    /// the wire. Attributes require the data to be a mapping.
    pub fn new(
        method: impl Into<String>,
        data: Option<Value>,
        attributes: Option<Value>,
    ) -> Result<Self> {
        let method = method.into();
        let has_attributes = attributes.is_some();

        let mut params = Map::new();
        if data.is_some() || attributes.is_some() {
            let mut data = match data {
                Some(Value::Object(map)) => Value::Object(map),
                Some(other) if attributes.is_some() => {
                    return Err(TrustlyError::data(format!(
                        "Data must be a mapping when attributes are provided, got {}",
                        kind_of(&other)
                    )))
                }
                Some(other) => other,
                None => Value::Object(Map::new()),
            };
            if let (Some(attributes), Value::Object(map)) = (attributes, &mut data) {
                map.insert("Attributes".into(), attributes);
            }
            params.insert("Data".into(), data);
        }

        let mut payload = Payload::vacuumed(Value::Object(
            [("params".to_string(), Value::Object(params))]
                .into_iter()
                .collect(),
        ))?;
        payload.set("method", method.clone());
        payload.object_mut("params");

        // Refund always carries an Attributes key, even when empty.
        if method == "Refund" && !has_attributes {
            let params = payload.object_mut("params");
            let data = params
                .entry("Data")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(data) = data {
                data.insert("Attributes".into(), Value::Null);
            }
        }

        payload.set("version", JSONRPC_VERSION);
        Ok(Self { payload })
    }

    /// Create a request carrying only a method.
    pub fn bare(method: impl Into<String>) -> Self {
        let mut payload = Payload::new();
        payload.set("method", method.into());
        payload.object_mut("params");
        payload.set("version", JSONRPC_VERSION);
        Self { payload }
    }

    /// The RPC method.
    pub fn method(&self) -> Option<&str> {
        self.payload.get("method").and_then(Value::as_str)
    }

    /// Replace the RPC method.
    pub fn set_method(&mut self, method: impl Into<String>) {
        self.payload.set("method", method.into());
    }

    /// The correlation id, if assigned.
    pub fn uuid(&self) -> Option<&str> {
        self.param("UUID").and_then(Value::as_str)
    }

    /// Assign the correlation id.
    pub fn set_uuid(&mut self, uuid: impl Into<String>) {
        self.set_param("UUID", uuid.into());
    }

    /// The signature, once the client has signed the request.
    pub fn signature(&self) -> Option<&str> {
        self.param("Signature").and_then(Value::as_str)
    }

    /// Fetch `params.<name>`.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params().and_then(|p| p.get(name))
    }

    /// The whole `params` mapping.
    pub fn params(&self) -> Option<&Map<String, Value>> {
        self.payload.get("params").and_then(Value::as_object)
    }

    /// Set `params.<name>`.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.payload
            .object_mut("params")
            .insert(name.into(), value.into());
    }

    /// Remove and return `params.<name>`.
    pub fn pop_param(&mut self, name: &str) -> Option<Value> {
        self.payload.object_mut("params").remove(name)
    }

    /// The `params.Data` value.
    pub fn data(&self) -> Option<&Value> {
        self.param("Data")
    }

    /// Fetch `params.Data.<name>`.
    pub fn data_field(&self, name: &str) -> Option<&Value> {
        self.data().and_then(|d| d.get(name))
    }

    /// Set `params.Data.<name>`, creating the Data mapping when needed.
    pub fn set_data(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.data_mut().insert(name.into(), value.into());
    }

    /// The `params.Data.Attributes` mapping.
    pub fn attributes(&self) -> Option<&Map<String, Value>> {
        self.data_field("Attributes").and_then(Value::as_object)
    }

    /// Fetch `params.Data.Attributes.<name>`.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes().and_then(|a| a.get(name))
    }

    /// Set `params.Data.Attributes.<name>`, creating containers when needed.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let slot = self
            .data_mut()
            .entry("Attributes")
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(attributes) = slot {
            attributes.insert(name.into(), value.into());
        }
    }

    /// Borrow the underlying payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The serialized envelope handed to the transport.
    pub fn to_json(&self) -> Result<String> {
        self.payload.to_json()
    }

    /// Indented envelope for debugging output.
    pub fn to_json_pretty(&self) -> Result<String> {
        self.payload.to_json_pretty()
    }

    fn data_mut(&mut self) -> &mut Map<String, Value> {
        let slot = self
            .payload
            .object_mut("params")
            .entry("Data")
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("Data was just made a mapping"),
        }
    }
}

impl Signable for JsonRpcRequest {
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

    #[test]
    fn test_envelope_shape() {
        let request = JsonRpcRequest::new(
            "Deposit",
            Some(json!({"EndUserID": "user", "MessageID": "msg"})),
            Some(json!({"Locale": "sv_SE", "Amount": null})),
        )
        .unwrap();

        let value = request.payload().clone().into_value();
        assert_eq!(
            value,
            json!({
                "method": "Deposit",
                "params": {"Data": {
                    "EndUserID": "user",
                    "MessageID": "msg",
                    "Attributes": {"Locale": "sv_SE"}
                }},
                "version": "1.1"
            })
        );
        assert!(request.uuid().is_none());
        assert!(request.signature().is_none());
    }

    #[test]
    fn test_empty_attributes_vanish() {
        let request = JsonRpcRequest::new(
            "Deposit",
            Some(json!({"EndUserID": "user"})),
            Some(json!({"Locale": null, "IP": null})),
        )
        .unwrap();
        assert!(request.attributes().is_none());
        assert_eq!(request.data(), Some(&json!({"EndUserID": "user"})));
    }

    #[test]
    fn test_attributes_require_mapping_data() {
        let err = JsonRpcRequest::new("Deposit", Some(json!(["x"])), Some(json!({"a": "b"})))
            .unwrap_err();
        assert!(matches!(err, TrustlyError::Data(_)));
    }

    #[test]
    fn test_refund_always_carries_attributes() {
        let request = JsonRpcRequest::new(
            "Refund",
            Some(json!({"OrderID": "1", "Amount": "2.00", "Currency": "EUR"})),
            None,
        )
        .unwrap();
        assert_eq!(request.data_field("Attributes"), Some(&Value::Null));
        assert!(request.to_json().unwrap().contains("\"Attributes\":null"));

        let mut request = request;
        request.set_uuid("u");
        assert_eq!(
            plaintext(&request.signing_parts()),
            "RefunduAmount2.00AttributesCurrencyEUROrderID1"
        );
    }

    #[test]
    fn test_mutators_create_containers() {
        let mut request = JsonRpcRequest::bare("Hello");
        assert!(request.data().is_none());

        request.set_data("Username", "merchant");
        request.set_attribute("Locale", "en_US");
        request.set_uuid("1234");
        request.set_param("Signature", "sig");

        assert_eq!(request.data_field("Username"), Some(&json!("merchant")));
        assert_eq!(request.attribute("Locale"), Some(&json!("en_US")));
        assert_eq!(request.uuid(), Some("1234"));
        assert_eq!(request.signature(), Some("sig"));
        assert_eq!(request.pop_param("Signature"), Some(json!("sig")));
        assert!(request.signature().is_none());

        request.set_method("Void");
        assert_eq!(request.method(), Some("Void"));
    }

    #[test]
    fn test_signing_parts_cover_data_only() {
        let mut request =
            JsonRpcRequest::new("Void", Some(json!({"OrderID": "42"})), None).unwrap();
        request.set_uuid("abc");
        request.set_param("Signature", "ignored");
        assert_eq!(plaintext(&request.signing_parts()), "VoidabcOrderID42");
    }
}
