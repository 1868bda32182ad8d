//! HTTP transport capability and its reqwest implementation.
//!
//! The client only ever talks to an [`HttpTransport`]; everything below the
//! status code and body bytes (pooling, TLS, proxies) lives behind it.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use thiserror::Error;
use tracing::warn;

use crate::options::{ClientOptions, Timeouts};

/// A fully prepared outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Timeouts the caller asked for. [`ReqwestTransport`] applies only the
    /// request timeout from here; its connection and socket timeouts come
    /// from the [`ClientOptions`] it was built with.
    pub timeouts: Timeouts,
}

/// Status and raw body of a completed exchange, whatever the status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Anything that stopped a call from yielding a usable 2xx body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFault {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportFault {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportFault::Timeout
        } else if e.is_connect() {
            TransportFault::Connect(e.to_string())
        } else {
            TransportFault::Network(e.to_string())
        }
    }
}

/// Sends one request and returns the raw exchange.
///
/// Implementations must be shareable across the worker pool. A non-2xx
/// status is not a fault at this level.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFault>;
}

/// [`HttpTransport`] over a single pooled `reqwest::Client`.
///
/// Connection and socket timeouts are fixed when the transport is built and
/// cannot change per request. Only the request timeout of an
/// [`HttpRequest`] is honored.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeouts: Timeouts,
}

impl ReqwestTransport {
    pub fn new(options: &ClientOptions) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(options)?,
            timeouts: options.timeouts,
        })
    }

    /// Timeouts the underlying connection pool was built with.
    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFault> {
        if request.timeouts.connection != self.timeouts.connection
            || request.timeouts.socket != self.timeouts.socket
        {
            warn!(
                requested = ?request.timeouts,
                built = ?self.timeouts,
                "connection and socket timeouts are fixed at build time, ignoring requested values"
            );
        }

        let response = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .timeout(request.timeouts.request)
            .body(request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(HttpResponse { status, body })
    }
}

/// Build a configured HTTP client from client options.
///
/// This applies common configuration like timeouts and proxies.
pub fn build_http_client(options: &ClientOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .connect_timeout(options.timeouts.connection)
        .read_timeout(options.timeouts.socket);

    if let Some(proxy_url) = &options.proxy {
        if let Ok(proxy) = reqwest::Proxy::all(proxy_url) {
            builder = builder.proxy(proxy);
        }
    }

    builder.build()
}

/// Add extra headers to a header map, skipping names or values that are not
/// valid HTTP.
pub fn add_extra_headers(headers: &mut HeaderMap, extra_headers: &Option<HashMap<String, String>>) {
    if let Some(extra) = extra_headers {
        for (key, value) in extra {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }
    }
}
