//! The signed JSON-RPC channel at `/api/1`.
//!
//! Per call: assign a uuid, inject credentials into `Data`, sign, send, then
//! verify the reply signature and its uuid before returning it. Any failed
//! check is fatal to the call.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};
use trustly_lib::{
    new_uuid, JsonRpcRequest, JsonRpcResponse, Notification, NotificationAcknowledgement,
    PrivateKeyStore, PublicKeyStore, Rejected, Result, Signer, TrustlyError,
};

use crate::api::ApiCore;
use crate::config::ApiConfig;
use crate::methods::{
    AccountPayout, ApproveWithdrawal, Capture, DenyWithdrawal, Deposit, MethodCall, Refund,
    RegisterAccount, SelectAccount, Void, Withdraw, P2P,
};
use crate::transport::Transport;
use crate::unsigned::UnsignedApi;

/// Endpoint path of the signed channel.
pub const SIGNED_PATH: &str = "/api/1";

/// Client for the signed channel.
#[derive(Debug)]
pub struct SignedApi {
    core: Arc<ApiCore>,
    signer: RwLock<Option<Arc<Signer>>>,
    legacy: UnsignedApi,
}

impl SignedApi {
    /// Create a client without a merchant key.
    ///
    /// Calls fail with a configuration error until a key is supplied through
    /// [`use_merchant_private_key`](Self::use_merchant_private_key) or
    /// [`load_merchant_private_key`](Self::load_merchant_private_key).
    pub fn new(
        config: ApiConfig,
        transport: Arc<dyn Transport>,
        key_store: Arc<dyn PublicKeyStore>,
    ) -> Result<Self> {
        let core = Arc::new(ApiCore::new(config, transport, key_store)?);
        Ok(Self {
            legacy: UnsignedApi::from_core(core.clone()),
            core,
            signer: RwLock::new(None),
        })
    }

    /// Create a client and load the merchant key from `private_key`.
    pub fn with_private_key(
        config: ApiConfig,
        transport: Arc<dyn Transport>,
        key_store: Arc<dyn PublicKeyStore>,
        private_key: &dyn PrivateKeyStore,
    ) -> Result<Self> {
        let api = Self::new(config, transport, key_store)?;
        api.load_merchant_private_key(private_key)?;
        Ok(api)
    }

    /// Install a merchant key given as PEM.
    ///
    /// Calls already past signing keep the key they started with.
    pub fn use_merchant_private_key(&self, pem: &str) -> Result<()> {
        self.install(Signer::from_pem(pem)?);
        Ok(())
    }

    /// Install the merchant key held by a key store.
    pub fn load_merchant_private_key(&self, store: &dyn PrivateKeyStore) -> Result<()> {
        self.install(store.load_signer()?);
        Ok(())
    }

    fn install(&self, signer: Signer) {
        *self.signer.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(signer));
        info!("merchant private key installed");
    }

    fn signer(&self) -> Result<Arc<Signer>> {
        self.signer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| {
                TrustlyError::Configuration("No private key has been loaded for signing".into())
            })
    }

    /// The shared client core.
    pub fn core(&self) -> &ApiCore {
        &self.core
    }

    /// Replace the merchant API credentials.
    pub fn set_credentials(&self, username: impl Into<String>, password: impl Into<String>) {
        self.core.set_credentials(username, password);
    }

    /// Point the client at another host. See [`ApiCore::set_host`].
    pub fn set_host(&self, host: impl Into<String>, port: u16, is_https: bool) -> Result<()> {
        self.core.set_host(host, port, is_https)
    }

    /// The most recently dispatched request.
    pub fn last_request(&self) -> Option<JsonRpcRequest> {
        self.core.last_request()
    }

    /// Sign and send a request, returning the verified reply.
    ///
    /// A uuid is assigned when the request has none.
    pub fn call(&self, mut request: JsonRpcRequest) -> Result<JsonRpcResponse> {
        let endpoint = self.core.snapshot();
        let signer = self.signer()?;

        if request.uuid().is_none() {
            request.set_uuid(new_uuid());
        }
        request.set_data("Username", endpoint.config.username.clone());
        request.set_data("Password", endpoint.config.password.clone());
        let signature = signer.sign_message(&request)?;
        request.set_param("Signature", signature);

        let raw = self.core.dispatch(&endpoint, SIGNED_PATH, &request)?;
        let response = JsonRpcResponse::parse(&raw, endpoint.config.error_shape)?;

        if !endpoint.verifier.verify_message(&response) {
            warn!(
                method = request.method().unwrap_or_default(),
                uuid = request.uuid().unwrap_or_default(),
                "response signature rejected"
            );
            return Err(TrustlyError::signature(
                "Incoming message signature is not valid",
                Rejected::Response(response),
            ));
        }

        if response.uuid() != request.uuid() {
            warn!(
                expected = request.uuid().unwrap_or_default(),
                received = response.uuid().unwrap_or_default(),
                "response uuid mismatch"
            );
            return Err(TrustlyError::data(
                "Incoming response is not related to request. UUID mismatch.",
            ));
        }

        Ok(response)
    }

    /// Build, sign and send a method call.
    pub fn call_method<M: MethodCall>(&self, method: &M) -> Result<JsonRpcResponse> {
        self.call(method.to_request()?)
    }

    /// Parse and verify a notification body.
    pub fn handle_notification(&self, body: &[u8]) -> Result<Notification> {
        self.core.handle_notification(body)
    }

    /// A signed acknowledgement for a notification.
    pub fn notification_response(
        &self,
        notification: &Notification,
        success: bool,
    ) -> Result<NotificationAcknowledgement> {
        let mut ack = self.core.notification_response(notification, success);
        let signature = self.signer()?.sign_message(&ack)?;
        ack.set_signature(signature);
        Ok(ack)
    }

    /// `Deposit`
    pub fn deposit(&self, params: &Deposit) -> Result<JsonRpcResponse> {
        self.call_method(params)
    }

    /// `Withdraw`
    pub fn withdraw(&self, params: &Withdraw) -> Result<JsonRpcResponse> {
        self.call_method(params)
    }

    /// `Refund`
    pub fn refund(&self, params: &Refund) -> Result<JsonRpcResponse> {
        self.call_method(params)
    }

    /// `DenyWithdrawal`
    pub fn deny_withdrawal(&self, params: &DenyWithdrawal) -> Result<JsonRpcResponse> {
        self.call_method(params)
    }

    /// `ApproveWithdrawal`
    pub fn approve_withdrawal(&self, params: &ApproveWithdrawal) -> Result<JsonRpcResponse> {
        self.call_method(params)
    }

    /// `SelectAccount`
    pub fn select_account(&self, params: &SelectAccount) -> Result<JsonRpcResponse> {
        self.call_method(params)
    }

    /// `RegisterAccount`
    pub fn register_account(&self, params: &RegisterAccount) -> Result<JsonRpcResponse> {
        self.call_method(params)
    }

    /// `AccountPayout`
    pub fn account_payout(&self, params: &AccountPayout) -> Result<JsonRpcResponse> {
        self.call_method(params)
    }

    /// `P2P`
    pub fn p2p(&self, params: &P2P) -> Result<JsonRpcResponse> {
        self.call_method(params)
    }

    /// `Capture`
    pub fn capture(&self, params: &Capture) -> Result<JsonRpcResponse> {
        self.call_method(params)
    }

    /// `Void`
    pub fn void(&self, params: &Void) -> Result<JsonRpcResponse> {
        self.call_method(params)
    }

    /// `Hello`, which is unsigned and goes through the legacy channel.
    pub fn hello(&self) -> Result<JsonRpcResponse> {
        self.legacy.hello()
    }
}
