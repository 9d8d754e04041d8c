//! Canonical serialization of value trees for signing.
//!
//! The wire encoding may reorder mapping keys, so signatures are computed over
//! a flattened string instead of the JSON text:
//!
//! - null contributes nothing
//! - scalars contribute their minimal textual form, booleans as `True` and
//!   `False` the way the provider renders them
//! - sequences contribute their elements in original order
//! - mappings contribute `key + value` pairs in ascending codepoint order of
//!   the key
//!
//! ```
//! use serde_json::json;
//! use trustly_lib::canonical::serialize;
//!
//! let value = json!({"b": "2", "a": ["x", "y"]});
//! assert_eq!(serialize(&value), "axyb2");
//! ```

use serde_json::Value;

/// Flatten a value tree into its canonical signing string.
pub fn serialize(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if *b { "True" } else { "False" }),
        Value::Array(items) => {
            for item in items {
                write_value(out, item);
            }
        }
        Value::Object(map) => {
            // `String: Ord` compares UTF-8 bytes, which matches codepoint order.
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            for key in keys {
                out.push_str(key);
                write_value(out, &map[key]);
            }
        }
    }
}
