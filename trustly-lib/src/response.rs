//! Replies received from the provider.
//!
//! A reply holds exactly one of `result` or `error`. Accessors read through
//! whichever node is present so callers never branch on the shape:
//!
//! ```text
//! {"version": "1.1", "result": {"method", "uuid", "signature", "data": {...}}}
//! {"version": "1.1", "error": {"error": {"method", "uuid", "signature",
//!                                        "data": {"code", "message"}},
//!                              "name": "JSONRPCError", "code", "message"}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::payload::{kind_of, Payload};
use crate::signature::{Signable, SigningParts};
use crate::{Result, TrustlyError, JSONRPC_VERSION};

/// What the transport handed back for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// HTTP reason phrase, when the transport reports one
    pub reason: Option<String>,
    /// Unparsed body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// A `200 OK` reply carrying `body`.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            reason: Some("OK".to_string()),
            body: body.into(),
        }
    }
}

/// Layout of error replies.
///
/// Providers have shipped two incompatible layouts. Which one a channel uses is
/// configured, never sniffed from the reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorShape {
    /// Signed error node at `error.error`, code and message in its `data`.
    #[default]
    Nested,
    /// Unsigned error node at `error` with top-level `code` and `message`.
    Flat,
}

/// A parsed reply.
#[derive(Debug, Clone)]
pub struct JsonRpcResponse {
    payload: Payload,
    status: u16,
    reason: Option<String>,
    body: Vec<u8>,
    shape: ErrorShape,
    success: bool,
}

impl JsonRpcResponse {
    /// Parse a transport reply.
    ///
    /// A body that is not JSON is a connection failure when the HTTP status
    /// was not 200 and a data error otherwise.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(raw), fields(status = raw.status)))]
    pub fn parse(raw: &RawResponse, shape: ErrorShape) -> Result<Self> {
        let tree: Value = match serde_json::from_slice(&raw.body) {
            Ok(tree) => tree,
            Err(_) if raw.status != 200 => {
                return Err(TrustlyError::Connection(format!(
                    "{} {}",
                    raw.status,
                    raw.reason.as_deref().unwrap_or_default()
                )))
            }
            Err(e) => return Err(e.into()),
        };
        let root = match tree {
            Value::Object(root) => root,
            other => {
                return Err(TrustlyError::data(format!(
                    "expected a JSON object in response, got {}",
                    kind_of(&other)
                )))
            }
        };

        check_version(root.get("version"))?;

        let has_result = root.get("result").is_some_and(|v| !v.is_null());
        let has_error = root.get("error").is_some_and(|v| !v.is_null());
        let success = match (has_result, has_error) {
            (true, false) => true,
            (false, true) => false,
            (true, true) => {
                return Err(TrustlyError::data(
                    "response carries both a result and an error",
                ))
            }
            (false, false) => {
                return Err(TrustlyError::data("no result or error in response"))
            }
        };

        Ok(Self {
            payload: Payload::from_map(root),
            status: raw.status,
            reason: raw.reason.clone(),
            body: raw.body.clone(),
            shape,
            success,
        })
    }

    /// Whether the reply carries a `result`.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Whether the reply carries an `error`.
    pub fn is_error(&self) -> bool {
        !self.success
    }

    /// The node the uniform accessors read: `result`, or the error node the
    /// configured shape points at.
    pub fn node(&self) -> Option<&Map<String, Value>> {
        let node = if self.success {
            self.payload.get("result")
        } else {
            let error = self.payload.get("error");
            match self.shape {
                ErrorShape::Nested => error.and_then(|e| e.get("error")),
                ErrorShape::Flat => error,
            }
        };
        node.and_then(Value::as_object)
    }

    /// Fetch `<node>.<name>`.
    pub fn result(&self, name: &str) -> Option<&Value> {
        self.node().and_then(|node| node.get(name))
    }

    /// The echoed RPC method.
    pub fn method(&self) -> Option<&str> {
        self.result("method").and_then(Value::as_str)
    }

    /// The echoed correlation id.
    pub fn uuid(&self) -> Option<&str> {
        self.result("uuid").and_then(Value::as_str)
    }

    /// The provider's signature.
    pub fn signature(&self) -> Option<&str> {
        self.result("signature").and_then(Value::as_str)
    }

    /// The `data` value of the node.
    pub fn data(&self) -> Option<&Value> {
        self.result("data")
    }

    /// Fetch `<node>.data.<name>`.
    pub fn data_field(&self, name: &str) -> Option<&Value> {
        self.data().and_then(|d| d.get(name))
    }

    /// The provider error code, for error replies.
    pub fn error_code(&self) -> Option<i64> {
        let code = self.error_field("code")?;
        code.as_i64()
            .or_else(|| code.as_str().and_then(|s| s.parse().ok()))
    }

    /// The provider error message, for error replies.
    pub fn error_message(&self) -> Option<&str> {
        self.error_field("message").and_then(Value::as_str)
    }

    /// HTTP status of the exchange.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// HTTP reason phrase of the exchange.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// The body exactly as received.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The error layout this reply was read with.
    pub fn shape(&self) -> ErrorShape {
        self.shape
    }

    /// Borrow the parsed payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    fn error_field(&self, name: &str) -> Option<&Value> {
        if self.success {
            return None;
        }
        match self.shape {
            ErrorShape::Nested => self.data_field(name),
            ErrorShape::Flat => self.result(name),
        }
    }
}

impl Signable for JsonRpcResponse {
    fn signing_parts(&self) -> SigningParts<'_> {
        SigningParts {
            method: self.method(),
            uuid: self.uuid(),
            data: self.data(),
            signature: self.signature(),
        }
    }
}

pub(crate) fn check_version(version: Option<&Value>) -> Result<()> {
    match version {
        Some(Value::String(v)) if v == JSONRPC_VERSION => Ok(()),
        Some(Value::String(v)) => Err(TrustlyError::Version(v.clone())),
        Some(other) => Err(TrustlyError::Version(other.to_string())),
        None => Err(TrustlyError::Version("(missing)".to_string())),
    }
}
