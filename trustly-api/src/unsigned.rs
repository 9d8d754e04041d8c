//! The legacy channel at `/api/Legacy`.
//!
//! Requests are not signed and replies are not verified. Authentication is a
//! session uuid obtained with `NewSessionCookie`, sent in place of the
//! password once cached.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use trustly_lib::{JsonRpcRequest, JsonRpcResponse, PublicKeyStore, Result, TrustlyError};

use crate::api::ApiCore;
use crate::config::ApiConfig;
use crate::methods::ViewQuery;
use crate::transport::Transport;

/// Endpoint path of the legacy channel.
pub const LEGACY_PATH: &str = "/api/Legacy";

/// Client for the legacy channel.
#[derive(Debug)]
pub struct UnsignedApi {
    core: Arc<ApiCore>,
    session: Mutex<Option<String>>,
    bootstrap: Mutex<()>,
}

impl UnsignedApi {
    /// Create a legacy client.
    pub fn new(
        config: ApiConfig,
        transport: Arc<dyn Transport>,
        key_store: Arc<dyn PublicKeyStore>,
    ) -> Result<Self> {
        Ok(Self::from_core(Arc::new(ApiCore::new(
            config, transport, key_store,
        )?)))
    }

    /// Create a legacy client sharing an existing core.
    pub fn from_core(core: Arc<ApiCore>) -> Self {
        Self {
            core,
            session: Mutex::new(None),
            bootstrap: Mutex::new(()),
        }
    }

    /// The shared client core.
    pub fn core(&self) -> &ApiCore {
        &self.core
    }

    /// The cached session uuid.
    pub fn session_uuid(&self) -> Option<String> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a session uuid is cached.
    pub fn has_session_uuid(&self) -> bool {
        self.session_uuid().is_some()
    }

    /// Use a session uuid obtained elsewhere.
    pub fn set_session_uuid(&self, session: impl Into<String>) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.into());
    }

    /// Forget the cached session; the next [`call`](Self::call) bootstraps
    /// a new one.
    pub fn clear_session(&self) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The most recently dispatched request.
    pub fn last_request(&self) -> Option<JsonRpcRequest> {
        self.core.last_request()
    }

    /// Obtain a session uuid with the static password.
    pub fn new_session_cookie(&self) -> Result<JsonRpcResponse> {
        self.clear_session();
        let response = self.send(JsonRpcRequest::bare("NewSessionCookie"))?;

        let session = response
            .is_success()
            .then(|| response.result("sessionuuid").and_then(Value::as_str))
            .flatten();
        match session {
            Some(session) => {
                self.set_session_uuid(session);
                info!("legacy session established");
                Ok(response)
            }
            None => {
                warn!(
                    code = response.error_code(),
                    message = response.error_message().unwrap_or_default(),
                    "legacy session bootstrap refused"
                );
                Err(TrustlyError::Authentication(format!(
                    "NewSessionCookie failed: {}",
                    response
                        .error_message()
                        .unwrap_or("no session uuid in reply")
                )))
            }
        }
    }

    /// Issue an arbitrary legacy call with `params` as top-level parameters.
    ///
    /// A session is bootstrapped first when none is cached. Null parameters
    /// are left out.
    pub fn call(
        &self,
        method: impl Into<String>,
        params: Map<String, Value>,
    ) -> Result<JsonRpcResponse> {
        let mut request = JsonRpcRequest::bare(method);
        for (name, value) in params {
            if !value.is_null() {
                request.set_param(name, value);
            }
        }

        {
            let _guard = self.bootstrap.lock().unwrap_or_else(PoisonError::into_inner);
            if !self.has_session_uuid() {
                self.new_session_cookie()?;
            }
        }

        self.send(request)
    }

    /// Fetch rows of a report view.
    pub fn get_view_stable(&self, query: &ViewQuery) -> Result<JsonRpcResponse> {
        let params = match serde_json::to_value(query)? {
            Value::Object(params) => params,
            _ => Map::new(),
        };
        self.call("GetViewStable", params)
    }

    /// `Hello`. Uses a cached session when there is one but never creates one.
    pub fn hello(&self) -> Result<JsonRpcResponse> {
        self.send(JsonRpcRequest::bare("Hello"))
    }

    fn send(&self, mut request: JsonRpcRequest) -> Result<JsonRpcResponse> {
        let endpoint = self.core.snapshot();
        let password = self
            .session_uuid()
            .unwrap_or_else(|| endpoint.config.password.clone());
        request.set_param("Username", endpoint.config.username.clone());
        request.set_param("Password", password);

        let raw = self.core.dispatch(&endpoint, LEGACY_PATH, &request)?;
        let response = JsonRpcResponse::parse(&raw, endpoint.config.legacy_error_shape)?;
        debug!(
            method = request.method().unwrap_or_default(),
            success = response.is_success(),
            "legacy reply"
        );
        Ok(response)
    }
}
