//! Client configuration.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::ClientError;

/// Default for each of the three transport timeouts.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// A secret string type for sensitive data like access tokens.
/// Prevents accidental logging or display of secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Transport timeouts. Exceeding any of them is an ordinary transport fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Establishing a connection.
    pub connection: Duration,
    /// The whole request, from send to the last body byte.
    pub request: Duration,
    /// Silence between reads on an open socket.
    pub socket: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connection: DEFAULT_TIMEOUT,
            request: DEFAULT_TIMEOUT,
            socket: DEFAULT_TIMEOUT,
        }
    }
}

/// Everything a [`Client`](crate::client::Client) is constructed from.
///
/// # Example
/// ```rust
/// use openai_gen::options::ClientOptions;
/// use std::time::Duration;
///
/// let options = ClientOptions::new("sk-...")
///     .with_request_timeout(Duration::from_secs(60))
///     .with_worker_threads(2);
/// assert_eq!(options.timeouts.connection, Duration::from_millis(30_000));
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Bearer token sent with every call
    pub access_token: SecretString,

    /// API base URL, `https://api.openai.com` when unset
    pub base_url: Option<String>,

    pub timeouts: Timeouts,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,

    /// Size of the owned worker pool; tokio's default when unset
    pub worker_threads: Option<usize>,
}

impl ClientOptions {
    /// Create new client options with an access token.
    pub fn new(access_token: impl Into<SecretString>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: None,
            timeouts: Timeouts::default(),
            proxy: None,
            extra_headers: None,
            worker_threads: None,
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set all three timeouts at once.
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the connection timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection = timeout;
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request = timeout;
        self
    }

    /// Set the socket timeout.
    pub fn with_socket_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.socket = timeout;
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set the number of worker threads of an owned pool.
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.access_token.expose_secret().trim().is_empty() {
            return Err(ClientError::Config("access token is required".to_string()));
        }
        if matches!(self.worker_threads, Some(0)) {
            return Err(ClientError::Config(
                "worker pool needs at least one thread".to_string(),
            ));
        }
        Ok(())
    }
}
