#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use trustly_api::{ApiConfig, HttpCall, SignedApi, Transport, UnsignedApi};
use trustly_lib::test_utils::{MockProvider, TestFixtures};
use trustly_lib::{RawResponse, Result, StaticKeyStore, TrustlyError};

/// One exchange seen by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub url: String,
    pub path: String,
    pub body: String,
}

impl RecordedCall {
    /// The body parsed as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    /// The JSON-RPC method of the recorded request.
    pub fn rpc_method(&self) -> String {
        self.json()["method"].as_str().unwrap_or_default().to_string()
    }
}

type Responder = Box<dyn Fn(&Value) -> Result<RawResponse> + Send + Sync>;

/// Transport that records every call and answers through a closure.
pub struct MockTransport {
    calls: Mutex<Vec<RecordedCall>>,
    responder: Responder,
}

impl MockTransport {
    pub fn new(responder: impl Fn(&Value) -> Result<RawResponse> + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Always answer with the same body.
    pub fn replying(body: impl Into<String>) -> Self {
        let body = body.into();
        Self::new(move |_| Ok(RawResponse::ok(body.clone())))
    }

    /// Always fail as if the host were unreachable.
    pub fn unreachable() -> Self {
        Self::new(|_| Err(TrustlyError::connection("connection refused")))
    }

    /// Answer every signed call with a correctly signed success echoing the
    /// request's method and uuid.
    pub fn echoing(data: Value) -> Self {
        let provider = MockProvider::new();
        Self::new(move |request| {
            let method = request["method"].as_str().unwrap_or_default();
            let uuid = request["params"]["UUID"].as_str().unwrap_or_default();
            Ok(RawResponse::ok(provider.result(method, uuid, data.clone())))
        })
    }

    /// Legacy endpoint: hands out `session` for NewSessionCookie and a plain
    /// result for anything else.
    pub fn legacy(session: &'static str) -> Self {
        let provider = MockProvider::new();
        Self::new(move |request| {
            let body = match request["method"].as_str() {
                Some("NewSessionCookie") => provider.legacy_result(json!({"sessionuuid": session})),
                Some(_) => provider.legacy_result(json!({"now": "2015-10-07 10:46:41.593291+02", "data": []})),
                None => provider.flat_error(620, "ERROR_UNKNOWN"),
            };
            Ok(RawResponse::ok(body))
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn rpc_methods(&self) -> Vec<String> {
        self.calls().iter().map(RecordedCall::rpc_method).collect()
    }

    pub fn last_call(&self) -> RecordedCall {
        self.calls().last().cloned().expect("no calls recorded")
    }
}

impl Transport for MockTransport {
    fn send(&self, call: &HttpCall<'_>) -> Result<RawResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: call.method.to_string(),
            url: call.url(),
            path: call.path.to_string(),
            body: call.body.to_string(),
        });
        let request: Value = serde_json::from_str(call.body).unwrap();
        (self.responder)(&request)
    }
}

pub fn key_store() -> Arc<StaticKeyStore> {
    Arc::new(
        StaticKeyStore::new().with_key(TestFixtures::TEST_HOST, TestFixtures::provider_public_pem()),
    )
}

pub fn test_config() -> ApiConfig {
    ApiConfig::new(TestFixtures::USERNAME, TestFixtures::PASSWORD).with_host(
        TestFixtures::TEST_HOST,
        443,
        true,
    )
}

/// A signed client with the merchant fixture key installed.
pub fn signed_api(transport: Arc<MockTransport>) -> SignedApi {
    let api = SignedApi::new(test_config(), transport, key_store()).unwrap();
    api.use_merchant_private_key(TestFixtures::MERCHANT_PEM)
        .unwrap();
    api
}

pub fn unsigned_api(transport: Arc<MockTransport>) -> UnsignedApi {
    UnsignedApi::new(test_config(), transport, key_store()).unwrap()
}
