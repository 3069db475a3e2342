// ── Core error types ──
//
// Reconciliation-level errors. Callers see which stage of the run failed
// (fetch, object lookup, batch apply) rather than raw HTTP failures; the
// `From<edgesync_api::Error>` impl covers the remaining transport cases.

use thiserror::Error;

use crate::address::AddressParseError;
use crate::source::FetchError;
use crate::store::ApplyError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Pipeline stages ──────────────────────────────────────────────
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error("Failed to {operation} dynamic object '{object}': {source}")]
    ObjectStore {
        operation: &'static str,
        object: String,
        #[source]
        source: edgesync_api::Error,
    },

    #[error("Dynamic object not found: {name}")]
    ObjectNotFound { name: String },

    #[error(transparent)]
    InvalidAddress(#[from] AddressParseError),

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to FMC at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("FMC API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Wrap an API failure with the object and operation it belongs to.
    pub(crate) fn object_store(
        operation: &'static str,
        object: impl Into<String>,
        source: edgesync_api::Error,
    ) -> Self {
        Self::ObjectStore {
            operation,
            object: object.into(),
            source,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<edgesync_api::Error> for CoreError {
    fn from(err: edgesync_api::Error) -> Self {
        match err {
            edgesync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            edgesync_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            edgesync_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: err.status(),
                    }
                }
            }
            edgesync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            edgesync_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            edgesync_api::Error::RateLimited { retry_after_secs } => CoreError::Api {
                message: format!("Rate limited -- retry after {retry_after_secs}s"),
                status: Some(429),
            },
            edgesync_api::Error::Api {
                message,
                category,
                status,
            } => CoreError::Api {
                message: match category {
                    Some(category) => format!("{message} ({category})"),
                    None => message,
                },
                status: Some(status),
            },
            edgesync_api::Error::SourceStatus { url, status } => CoreError::Api {
                message: format!("{url} returned HTTP {status}"),
                status: Some(status),
            },
            edgesync_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Unexpected response: {message}"),
                status: None,
            },
        }
    }
}
