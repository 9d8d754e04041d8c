//! The mapping every protocol message is built on.
//!
//! A [`Payload`] owns a JSON object and is only mutated through
//! [`Payload::get`], [`Payload::set`] and [`Payload::pop`]. Construction from
//! an existing tree runs [`vacuum`] first so that absent optional fields never
//! reach the wire or the signature plaintext.

use serde_json::{Map, Value};

use crate::{Result, TrustlyError};

/// Recursively drop null entries and the containers left empty by that.
///
/// Returns `None` when the whole value vacuums away. Containers that were
/// already empty before pruning also collapse, so the operation is
/// idempotent.
pub fn vacuum(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Array(items) => {
            let kept: Vec<Value> = items.into_iter().filter_map(vacuum).collect();
            if kept.is_empty() {
                None
            } else {
                Some(Value::Array(kept))
            }
        }
        Value::Object(map) => {
            let kept: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| vacuum(v).map(|v| (k, v)))
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some(Value::Object(kept))
            }
        }
        scalar => Some(scalar),
    }
}

/// Root mapping of a protocol message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Payload {
    root: Map<String, Value>,
}

impl Payload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a payload from a tree, vacuuming it first.
    ///
    /// A tree that vacuums away entirely yields an empty payload. A tree whose
    /// root is not a mapping is rejected.
    pub fn vacuumed(tree: Value) -> Result<Self> {
        match vacuum(tree) {
            None => Ok(Self::new()),
            Some(Value::Object(root)) => Ok(Self { root }),
            Some(other) => Err(TrustlyError::data(format!(
                "payload root must be a mapping, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Wrap a received mapping as-is. Inbound messages are never vacuumed
    /// because pruning would change what the peer signed.
    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Parse a JSON document whose root must be a mapping.
    pub fn parse(body: &[u8]) -> Result<Self> {
        match serde_json::from_slice::<Value>(body)? {
            Value::Object(root) => Ok(Self { root }),
            other => Err(TrustlyError::data(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Fetch a top-level key.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.root.get(name)
    }

    /// Fetch a top-level key for in-place mutation.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.root.get_mut(name)
    }

    /// Set a top-level key, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.root.insert(name.into(), value.into())
    }

    /// Remove a top-level key.
    pub fn pop(&mut self, name: &str) -> Option<Value> {
        self.root.remove(name)
    }

    /// Fetch a nested mapping, creating (or replacing a non-mapping with) an
    /// empty one when needed.
    pub fn object_mut(&mut self, name: &str) -> &mut Map<String, Value> {
        let slot = self
            .root
            .entry(name.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just made an object"),
        }
    }

    /// Borrow the whole root mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Consume into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Compact JSON representation.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.root)?)
    }

    /// Human-readable JSON with 4-space indentation and sorted keys.
    pub fn to_json_pretty(&self) -> Result<String> {
        use serde::Serialize;

        let sorted = sort_keys(&Value::Object(self.root.clone()));
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        sorted.serialize(&mut ser)?;
        String::from_utf8(out).map_err(|e| TrustlyError::data(e.to_string()))
    }
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            // Map order depends on serde_json's `preserve_order` feature.
            Value::Object(
                keys.into_iter()
                    .map(|k| (k.clone(), sort_keys(&map[k])))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vacuum_drops_nulls_and_empty_containers() {
        let tree = json!({
            "keep": "x",
            "gone": null,
            "nested": {"a": null, "b": {"c": null}},
            "list": [null, {"d": null}, "e"],
            "empty": {}
        });
        assert_eq!(vacuum(tree), Some(json!({"keep": "x", "list": ["e"]})));
    }

    #[test]
    fn test_vacuum_collapses_everything() {
        assert_eq!(vacuum(json!({"a": {"b": [null]}})), None);
        assert_eq!(vacuum(Value::Null), None);
    }

    #[test]
    fn test_vacuum_keeps_falsy_scalars() {
        let tree = json!({"zero": 0, "no": false, "blank": ""});
        assert_eq!(vacuum(tree.clone()), Some(tree));
    }

    #[test]
    fn test_vacuumed_rejects_scalar_root() {
        assert!(Payload::vacuumed(json!("scalar")).is_err());
        assert!(Payload::vacuumed(json!({"a": null})).unwrap().as_map().is_empty());
    }

    #[test]
    fn test_get_set_pop() {
        let mut payload = Payload::new();
        assert!(payload.set("method", "Deposit").is_none());
        assert_eq!(payload.get("method"), Some(&json!("Deposit")));
        assert_eq!(payload.pop("method"), Some(json!("Deposit")));
        assert!(payload.get("method").is_none());
        assert!(payload.pop("method").is_none());
    }

    #[test]
    fn test_object_mut_replaces_scalars() {
        let mut payload = Payload::new();
        payload.set("params", 5);
        payload.object_mut("params").insert("UUID".into(), json!("u"));
        assert_eq!(payload.get("params"), Some(&json!({"UUID": "u"})));
    }

    #[test]
    fn test_parse_requires_object() {
        assert!(Payload::parse(b"[1,2]").is_err());
        assert!(Payload::parse(b"not json").is_err());
        assert_eq!(
            Payload::parse(br#"{"version":"1.1"}"#).unwrap().get("version"),
            Some(&json!("1.1"))
        );
    }

    #[test]
    fn test_pretty_json_sorts_keys() {
        let payload = Payload::vacuumed(json!({"b": 1, "a": {"d": 2, "c": 3}})).unwrap();
        let pretty = payload.to_json_pretty().unwrap();
        assert!(pretty.find("\"a\"").unwrap() < pretty.find("\"b\"").unwrap());
        assert!(pretty.find("\"c\"").unwrap() < pretty.find("\"d\"").unwrap());
        assert!(pretty.contains("\n    \"a\""));
    }
}
