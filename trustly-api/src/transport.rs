//! Transport collaborator.
//!
//! The clients never open connections themselves. Every call is handed to a
//! [`Transport`] as an [`HttpCall`], and whatever status, reason and body come
//! back are parsed by the client.

use trustly_lib::{RawResponse, Result};

/// One outbound HTTP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpCall<'a> {
    /// HTTP method, always `POST` for the protocol
    pub method: &'a str,
    /// Scheme, host and non-default port, e.g. `https://test.trustly.com`
    pub base_url: &'a str,
    /// Endpoint path, `/api/1` or `/api/Legacy`
    pub path: &'a str,
    /// Serialized JSON-RPC envelope
    pub body: &'a str,
}

impl HttpCall<'_> {
    /// Full target URL.
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }
}

/// Sends serialized envelopes to the provider.
///
/// Timeouts and cancellation are the implementation's concern. Any failure
/// to obtain a reply must surface as
/// [`TrustlyError::Connection`](trustly_lib::TrustlyError::Connection).
pub trait Transport: Send + Sync {
    /// Perform the exchange and return the raw reply.
    fn send(&self, call: &HttpCall<'_>) -> Result<RawResponse>;
}

#[cfg(feature = "http-transport")]
pub use http::HttpTransport;

#[cfg(feature = "http-transport")]
mod http {
    use std::time::Duration;

    use trustly_lib::{RawResponse, Result, TrustlyError};

    use super::{HttpCall, Transport};

    /// Blocking HTTPS transport built on `reqwest`.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: reqwest::blocking::Client,
    }

    impl HttpTransport {
        /// Create a transport with the given request timeout.
        pub fn new(timeout_secs: u64) -> Result<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .map_err(TrustlyError::connection)?;
            Ok(Self { client })
        }

        /// Wrap an already configured client.
        pub fn with_client(client: reqwest::blocking::Client) -> Self {
            Self { client }
        }
    }

    impl Transport for HttpTransport {
        fn send(&self, call: &HttpCall<'_>) -> Result<RawResponse> {
            let method = reqwest::Method::from_bytes(call.method.as_bytes())
                .map_err(TrustlyError::connection)?;
            let response = self
                .client
                .request(method, call.url())
                .header("Content-Type", "application/json; charset=utf-8")
                .body(call.body.to_string())
                .send()
                .map_err(TrustlyError::connection)?;

            let status = response.status();
            let body = response.bytes().map_err(TrustlyError::connection)?;
            Ok(RawResponse {
                status: status.as_u16(),
                reason: status.canonical_reason().map(str::to_string),
                body: body.to_vec(),
            })
        }
    }
}
