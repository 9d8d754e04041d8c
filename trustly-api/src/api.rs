//! State and behaviour shared by the signed and legacy clients.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, info, warn};
use trustly_lib::{
    JsonRpcRequest, Notification, NotificationAcknowledgement, PublicKeyStore, RawResponse,
    Rejected, Result, Signable, TrustlyError, Verifier,
};

use crate::config::ApiConfig;
use crate::transport::{HttpCall, Transport};

/// Configuration together with the provider key resolved for its host.
///
/// Swapped as a whole so a call never sees a host paired with another host's
/// key.
#[derive(Debug)]
pub struct Endpoint {
    /// Settings in effect
    pub config: ApiConfig,
    /// Provider key for `config.host`
    pub verifier: Arc<Verifier>,
}

/// Shared client core: configuration, provider key, transport and the most
/// recent request.
pub struct ApiCore {
    endpoint: RwLock<Arc<Endpoint>>,
    transport: Arc<dyn Transport>,
    key_store: Arc<dyn PublicKeyStore>,
    last_request: Mutex<Option<JsonRpcRequest>>,
}

impl ApiCore {
    /// Create a core, resolving the provider key for the configured host.
    pub fn new(
        config: ApiConfig,
        transport: Arc<dyn Transport>,
        key_store: Arc<dyn PublicKeyStore>,
    ) -> Result<Self> {
        let verifier = key_store.resolve(&config.host, config.port)?;
        Ok(Self {
            endpoint: RwLock::new(Arc::new(Endpoint {
                config,
                verifier: Arc::new(verifier),
            })),
            transport,
            key_store,
            last_request: Mutex::new(None),
        })
    }

    /// The endpoint a new call should run against.
    pub fn snapshot(&self) -> Arc<Endpoint> {
        self.endpoint
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// A copy of the current configuration.
    pub fn config(&self) -> ApiConfig {
        self.snapshot().config.clone()
    }

    /// The current provider key.
    pub fn verifier(&self) -> Arc<Verifier> {
        self.snapshot().verifier.clone()
    }

    /// Point the client at another host.
    ///
    /// The provider key is resolved first; when that fails the previous host
    /// and key stay in effect.
    pub fn set_host(&self, host: impl Into<String>, port: u16, is_https: bool) -> Result<()> {
        let host = host.into();
        let verifier = self.key_store.resolve(&host, port)?;

        let mut endpoint = self.endpoint.write().unwrap_or_else(PoisonError::into_inner);
        let mut config = endpoint.config.clone();
        config.host = host;
        config.port = port;
        config.is_https = is_https;
        info!(host = %config.host, port, is_https, "provider host changed");
        *endpoint = Arc::new(Endpoint {
            config,
            verifier: Arc::new(verifier),
        });
        Ok(())
    }

    /// Replace the merchant API credentials.
    pub fn set_credentials(&self, username: impl Into<String>, password: impl Into<String>) {
        let mut endpoint = self.endpoint.write().unwrap_or_else(PoisonError::into_inner);
        let mut config = endpoint.config.clone();
        config.username = username.into();
        config.password = password.into();
        let verifier = endpoint.verifier.clone();
        info!("API credentials replaced");
        *endpoint = Arc::new(Endpoint { config, verifier });
    }

    /// Scheme, host and non-default port of the current host.
    pub fn base_url(&self) -> String {
        self.snapshot().config.base_url()
    }

    /// Full URL of an endpoint path on the current host.
    pub fn url(&self, path: &str) -> String {
        self.snapshot().config.url(path)
    }

    /// Check a provider signature with the current key.
    pub fn verify<M: Signable + ?Sized>(&self, message: &M) -> bool {
        self.verifier().verify_message(message)
    }

    /// Parse and verify a notification body.
    ///
    /// A notification whose signature does not verify is returned inside the
    /// error, never as a success.
    pub fn handle_notification(&self, body: &[u8]) -> Result<Notification> {
        let notification = Notification::parse(body)?;
        if !self.verify(&notification) {
            warn!(
                method = notification.method().unwrap_or_default(),
                uuid = notification.uuid().unwrap_or_default(),
                "notification signature rejected"
            );
            return Err(TrustlyError::signature(
                "Incoming notification signature is not valid",
                Rejected::Notification(notification),
            ));
        }
        debug!(
            method = notification.method().unwrap_or_default(),
            uuid = notification.uuid().unwrap_or_default(),
            "notification verified"
        );
        Ok(notification)
    }

    /// An unsigned acknowledgement for a notification.
    pub fn notification_response(
        &self,
        notification: &Notification,
        success: bool,
    ) -> NotificationAcknowledgement {
        NotificationAcknowledgement::new(notification, success)
    }

    /// The most recently dispatched request.
    ///
    /// Carries credentials; do not log it.
    pub fn last_request(&self) -> Option<JsonRpcRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Hand a finished request to the transport.
    pub(crate) fn dispatch(
        &self,
        endpoint: &Endpoint,
        path: &str,
        request: &JsonRpcRequest,
    ) -> Result<RawResponse> {
        *self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(request.clone());

        let body = request.to_json()?;
        let base_url = endpoint.config.base_url();
        debug!(
            method = request.method().unwrap_or_default(),
            uuid = request.uuid().unwrap_or_default(),
            path,
            "dispatching request"
        );

        self.transport
            .send(&HttpCall {
                method: "POST",
                base_url: &base_url,
                path,
                body: &body,
            })
            .map_err(|e| match e {
                TrustlyError::Connection(_) => e,
                other => TrustlyError::Connection(other.to_string()),
            })
    }
}

impl std::fmt::Debug for ApiCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCore")
            .field("endpoint", &self.snapshot())
            .finish_non_exhaustive()
    }
}

/// Render a flag the way the API expects it: `"1"` or `"0"`.
pub fn api_bool(value: Option<bool>) -> Option<&'static str> {
    value.map(|v| if v { "1" } else { "0" })
}
