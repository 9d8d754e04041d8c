mod mock_implementations;

use mock_implementations::{unsigned_api, MockTransport};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use trustly_api::methods::ViewQuery;
use trustly_api::LEGACY_PATH;
use trustly_lib::test_utils::MockProvider;
use trustly_lib::{RawResponse, TrustlyError, TrustlyErrorCode};

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[test]
fn test_first_call_bootstraps_exactly_once() {
    let transport = Arc::new(MockTransport::legacy("7d4bd94e-75a1-4d3a-b1ce-56b02b2cf8a5"));
    let api = unsigned_api(transport.clone());
    assert!(!api.has_session_uuid());

    api.call("GetWithdrawals", params(json!({"OrderID": "1"}))).unwrap();
    api.call("GetWithdrawals", params(json!({"OrderID": "2"}))).unwrap();

    assert_eq!(
        transport.rpc_methods(),
        vec!["NewSessionCookie", "GetWithdrawals", "GetWithdrawals"]
    );
    assert_eq!(
        api.session_uuid().as_deref(),
        Some("7d4bd94e-75a1-4d3a-b1ce-56b02b2cf8a5")
    );

    let calls = transport.calls();
    let bootstrap = calls[0].json();
    assert_eq!(bootstrap["params"]["Username"], json!("testusername"));
    assert_eq!(bootstrap["params"]["Password"], json!("testpassword"));
    assert_eq!(calls[0].path, LEGACY_PATH);

    let follow_up = calls[1].json();
    assert_eq!(
        follow_up["params"]["Password"],
        json!("7d4bd94e-75a1-4d3a-b1ce-56b02b2cf8a5")
    );
    assert_eq!(follow_up["params"]["OrderID"], json!("1"));
}

#[test]
fn test_cached_session_skips_bootstrap() {
    let transport = Arc::new(MockTransport::legacy("fresh"));
    let api = unsigned_api(transport.clone());
    api.set_session_uuid("cached");

    api.call("GetWithdrawals", Map::new()).unwrap();

    assert_eq!(transport.rpc_methods(), vec!["GetWithdrawals"]);
    assert_eq!(transport.last_call().json()["params"]["Password"], json!("cached"));
}

#[test]
fn test_clear_session_forces_new_bootstrap() {
    let transport = Arc::new(MockTransport::legacy("s1"));
    let api = unsigned_api(transport.clone());

    api.call("Balance", Map::new()).unwrap();
    api.clear_session();
    api.call("Balance", Map::new()).unwrap();

    assert_eq!(
        transport.rpc_methods(),
        vec!["NewSessionCookie", "Balance", "NewSessionCookie", "Balance"]
    );
}

#[test]
fn test_refused_bootstrap_is_authentication_error() {
    let provider = MockProvider::new();
    let transport = Arc::new(MockTransport::replying(
        provider.flat_error(616, "ERROR_INVALID_CREDENTIALS"),
    ));
    let api = unsigned_api(transport.clone());

    let err = api.call("Balance", Map::new()).unwrap_err();
    assert_eq!(err.code(), TrustlyErrorCode::Authentication);
    assert!(err.to_string().contains("ERROR_INVALID_CREDENTIALS"));
    assert!(!api.has_session_uuid());
    assert_eq!(transport.rpc_methods(), vec!["NewSessionCookie"]);
}

#[test]
fn test_bootstrap_without_session_uuid_is_authentication_error() {
    let provider = MockProvider::new();
    let transport = Arc::new(MockTransport::replying(
        provider.legacy_result(json!({"now": "2015-10-07"})),
    ));
    let api = unsigned_api(transport);

    let err = api.new_session_cookie().unwrap_err();
    assert!(matches!(err, TrustlyError::Authentication(_)));
}

#[test]
fn test_hello_never_bootstraps() {
    let transport = Arc::new(MockTransport::legacy("s1"));
    let api = unsigned_api(transport.clone());

    api.hello().unwrap();
    assert_eq!(transport.rpc_methods(), vec!["Hello"]);
    assert!(!api.has_session_uuid());
}

#[test]
fn test_error_replies_are_read_flat() {
    let provider = MockProvider::new();
    let transport = Arc::new(MockTransport::replying(provider.flat_error(620, "ERROR_UNKNOWN")));
    let api = unsigned_api(transport);

    let response = api.hello().unwrap();
    assert!(response.is_error());
    assert_eq!(response.error_code(), Some(620));
    assert_eq!(response.error_message(), Some("ERROR_UNKNOWN"));
}

#[test]
fn test_get_view_stable_sends_query_params() {
    let transport = Arc::new(MockTransport::legacy("s1"));
    let api = unsigned_api(transport.clone());

    let mut query = ViewQuery::new("Transfers");
    query.sort_order = Some("desc".into());
    api.get_view_stable(&query).unwrap();

    let sent = transport.last_call().json();
    assert_eq!(sent["method"], json!("GetViewStable"));
    assert_eq!(sent["params"]["ViewName"], json!("Transfers"));
    assert_eq!(sent["params"]["Limit"], json!(100));
    assert_eq!(sent["params"]["Offset"], json!(0));
    assert_eq!(sent["params"]["SortOrder"], json!("desc"));
    assert!(sent["params"].get("DateOrder").is_none());
}

#[test]
fn test_null_params_are_left_out() {
    let transport = Arc::new(MockTransport::legacy("s1"));
    let api = unsigned_api(transport.clone());

    api.call("Balance", params(json!({"Currency": null, "Limit": 5})))
        .unwrap();

    let sent = transport.last_call().json();
    assert!(sent["params"].get("Currency").is_none());
    assert_eq!(sent["params"]["Limit"], json!(5));
}

#[test]
fn test_bootstrap_connection_failure() {
    let transport = Arc::new(MockTransport::new(|_| {
        Ok(RawResponse {
            status: 502,
            reason: Some("Bad Gateway".into()),
            body: b"upstream".to_vec(),
        })
    }));
    let api = unsigned_api(transport);

    let err = api.call("Balance", Map::new()).unwrap_err();
    assert_eq!(err.code(), TrustlyErrorCode::Connection);
}
