use thiserror::Error;

/// Top-level error type for the `edgesync-api` crate.
///
/// Covers every failure mode across both HTTP surfaces:
/// FMC authentication, transport, the FMC config API, and edge-list sources.
/// `edgesync-core` maps these into reconciliation-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token generation failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Access token expired or was revoked mid-run.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// FMC enforces a per-user request budget (120 req/min).
    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // ── FMC config API ──────────────────────────────────────────────
    /// Structured error from the FMC REST API.
    #[error("FMC API error (HTTP {status}): {message}")]
    Api {
        message: String,
        category: Option<String>,
        status: u16,
    },

    // ── Edge-list sources ───────────────────────────────────────────
    /// Non-2xx response from an edge-server list endpoint.
    #[error("list source {url} returned HTTP {status}")]
    SourceStatus { url: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a transient error worth re-running the job for.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } | Self::SourceStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The HTTP status behind this error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Api { status, .. } | Self::SourceStatus { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }
}
