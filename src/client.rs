//! Async client and its error types.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::http::{add_extra_headers, HttpRequest, HttpTransport, ReqwestTransport, TransportFault};
use crate::options::{ClientOptions, Timeouts};
use crate::pool::{Pending, WorkerPool};
use crate::request::{CompletionRequest, ImageRequest};
use crate::response::{CompletionResponse, ImageResponse};
use crate::translate::{self, TranslationError};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com";
const COMPLETIONS_PATH: &str = "/v1/completions";
const IMAGES_PATH: &str = "/v1/images/generations";

/// Errors raised while building a client or validating a request.
///
/// Failures of an individual call are never returned as errors; they are
/// reported on the response, see [`CallFailure`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Worker pool error: {0}")]
    Runtime(std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Why a call resolved to a placeholder response instead of a server result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallFailure {
    #[error(transparent)]
    Transport(#[from] TransportFault),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("failed to encode request: {0}")]
    Encode(String),

    /// The worker pool shut down before the call finished.
    #[error("call interrupted by worker pool shutdown")]
    Interrupted,
}

impl From<TranslationError> for CallFailure {
    fn from(e: TranslationError) -> Self {
        match e {
            TranslationError::Encode(reason) => CallFailure::Encode(reason),
            TranslationError::MalformedResponse(reason) => CallFailure::MalformedResponse(reason),
        }
    }
}

/// Client for the completion and image generation endpoints.
///
/// Every call is dispatched onto the client's [`WorkerPool`] and returns a
/// [`Pending`] future at once; the calling task is never blocked. Calls are
/// independent: concurrent calls complete in no particular order, and each
/// resolves exactly once, either to a server result or to a placeholder with
/// `success == false`.
///
/// Dropping the client does not cancel anything: an owned pool stays up until
/// every dispatched call has finished. Use [`Client::shutdown`] to interrupt.
///
/// # Example
/// ```no_run
/// use openai_gen::client::Client;
/// use openai_gen::options::ClientOptions;
/// use openai_gen::request::CompletionRequest;
///
/// # async fn run() -> Result<(), openai_gen::client::ClientError> {
/// let client = Client::new(ClientOptions::new("sk-..."))?;
/// let response = client
///     .generate_completions(CompletionRequest::new("Say hello"))
///     .await;
///
/// if response.success {
///     println!("{}", response.first_text().unwrap_or_default());
/// } else {
///     eprintln!("call failed: {:?}", response.failure);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Client {
    inner: Arc<Inner>,
    pool: WorkerPool,
}

struct Inner {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    headers: HeaderMap,
    timeouts: Timeouts,
}

impl Client {
    /// Create a client with its own reqwest connection pool and worker pool.
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        options.validate()?;
        let transport = Arc::new(ReqwestTransport::new(&options)?);
        let pool = WorkerPool::new(options.worker_threads)?;
        Self::with_parts(options, transport, pool)
    }

    /// Create a client from an explicit transport and worker pool.
    pub fn with_parts(
        options: ClientOptions,
        transport: Arc<dyn HttpTransport>,
        pool: WorkerPool,
    ) -> Result<Self, ClientError> {
        options.validate()?;

        let mut headers = HeaderMap::new();
        add_extra_headers(&mut headers, &options.extra_headers);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            options.access_token.expose_secret()
        ))
        .map_err(|_| ClientError::Config("Invalid access token".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let base_url = options
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            inner: Arc::new(Inner {
                transport,
                base_url,
                headers,
                timeouts: options.timeouts,
            }),
            pool,
        })
    }

    /// Generate text completions for `request`.
    pub fn generate_completions(&self, request: CompletionRequest) -> Pending<CompletionResponse> {
        let interrupted = CompletionResponse::failed(&request, CallFailure::Interrupted);
        let inner = Arc::clone(&self.inner);

        self.pool.spawn(
            async move {
                match inner.completions(&request).await {
                    Ok(response) => response,
                    Err(failure) => {
                        warn!(model = %request.model, %failure, "completion call failed");
                        CompletionResponse::failed(&request, failure)
                    }
                }
            },
            interrupted,
        )
    }

    /// Generate images for `request`.
    pub fn generate_images(&self, request: ImageRequest) -> Pending<ImageResponse> {
        let interrupted = ImageResponse::failed(&request, CallFailure::Interrupted);
        let inner = Arc::clone(&self.inner);

        self.pool.spawn(
            async move {
                match inner.images(&request).await {
                    Ok(response) => response,
                    Err(failure) => {
                        warn!(size = %request.size, %failure, "image call failed");
                        ImageResponse::failed(&request, failure)
                    }
                }
            },
            interrupted,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Stop the worker pool if the client owns it. Calls still in flight
    /// resolve with [`CallFailure::Interrupted`].
    pub fn shutdown(self) {
        self.pool.shutdown();
    }
}

impl Inner {
    async fn completions(&self, request: &CompletionRequest) -> Result<CompletionResponse, CallFailure> {
        let body = translate::encode_completion_request(request)?;
        let body = self.post(COMPLETIONS_PATH, body).await?;
        Ok(translate::decode_completion_response(&body)?)
    }

    async fn images(&self, request: &ImageRequest) -> Result<ImageResponse, CallFailure> {
        let body = translate::encode_image_request(request)?;
        let body = self.post(IMAGES_PATH, body).await?;
        Ok(translate::decode_image_response(&body, request.response_format)?)
    }

    /// POST `body` to `path` and return the body of a 2xx response.
    async fn post(&self, path: &str, body: Vec<u8>) -> Result<Bytes, TransportFault> {
        let url = format!("{}{}", self.base_url, path);
        trace!(%url, body = %String::from_utf8_lossy(&body), "sending request");
        debug!(%url, "dispatching call");

        let response = self
            .transport
            .send(HttpRequest {
                method: Method::POST,
                url,
                headers: self.headers.clone(),
                body: Bytes::from(body),
                timeouts: self.timeouts,
            })
            .await?;

        debug!(status = response.status, "call completed");
        if !response.is_success() {
            return Err(status_fault(response.status, &response.body));
        }
        Ok(response.body)
    }
}

/// Turn a non-2xx exchange into a fault, preferring the service's own message.
fn status_fault(status: u16, body: &[u8]) -> TransportFault {
    let message = match serde_json::from_slice::<OpenAiErrorResponse>(body) {
        Ok(error_resp) => error_resp.error.message,
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    };
    TransportFault::Status { status, message }
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiError,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiError {
    message: String,
}
