use thiserror::Error;

/// Top-level error type for the `meraki-api` crate.
///
/// Covers authentication, transport, HTTP status, and decoding failures.
/// `meraki-inventory-core` wraps these verbatim; nothing downstream
/// branches on the variant, only on the rendered text.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// API key could not be encoded as a header value.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Dashboard rejected the API key (HTTP 401).
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Key is valid but lacks access to the resource (HTTP 403).
    #[error("Access denied: {message}")]
    Forbidden { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Redirect chain exceeded the hop limit.
    #[error("Too many redirects (limit {limit}) while requesting {url}")]
    TooManyRedirects { url: String, limit: usize },

    /// 3xx response without a usable `Location` header.
    #[error("Redirect from {url} is missing a Location header")]
    MissingRedirectLocation { url: String },

    // ── Dashboard API ───────────────────────────────────────────────
    /// Rate limited (HTTP 429). The client does not retry.
    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Resource does not exist or is not visible to this key (HTTP 404).
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// Any other non-success status, with the `errors` array flattened.
    #[error("Dashboard API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the dashboard refused the credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::InvalidApiKey | Self::Forbidden { .. }
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited { .. } => true,
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidApiKey => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
