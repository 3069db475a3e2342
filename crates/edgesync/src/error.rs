//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use edgesync_config::ConfigError;
use edgesync_core::{ApplyError, BatchDirection, CoreError, FetchError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const SOURCE: i32 = 9;
    pub const PARTIAL_APPLY: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to FMC at {url}")]
    #[diagnostic(
        code(edgesync::connection_failed),
        help(
            "{reason}\n\
             Check that the FMC is reachable from this host.\n\
             For self-signed certificates try: edgesync sync --insecure"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("FMC authentication failed")]
    #[diagnostic(
        code(edgesync::auth_failed),
        help(
            "{message}\n\
             Verify the API user's credentials. Store a new password with:\n\
             edgesync config init, or set EDGESYNC_PASSWORD."
        )
    )]
    AuthFailed { message: String },

    // ── Sources ──────────────────────────────────────────────────────
    #[error("Could not build the desired address set")]
    #[diagnostic(
        code(edgesync::source),
        help(
            "Nothing was sent to the FMC.\n\
             Check the list URLs with: edgesync sources fetch"
        )
    )]
    Source {
        #[source]
        source: FetchError,
    },

    // ── Apply ────────────────────────────────────────────────────────
    #[error("Update of object {object_id} stopped at {direction} batch {batch_index}")]
    #[diagnostic(
        code(edgesync::partial_apply),
        help(
            "{applied} batch(es) were applied and stay in place; {remaining} were not sent.\n\
             Re-run `edgesync sync` to converge."
        )
    )]
    PartialApply {
        object_id: String,
        direction: BatchDirection,
        batch_index: usize,
        applied: usize,
        remaining: usize,
        #[source]
        source: ApplyError,
    },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Dynamic object '{name}' not found")]
    #[diagnostic(
        code(edgesync::not_found),
        help("Run: edgesync objects list to see available dynamic objects")
    )]
    NotFound { name: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("FMC request failed: {message}")]
    #[diagnostic(code(edgesync::api_error))]
    ApiError { message: String },

    #[error("FMC request failed: {message}")]
    #[diagnostic(
        code(edgesync::transient),
        help(
            "The FMC is busy or briefly unreachable; nothing past this request was sent.\n\
             Re-run `edgesync sync` once it recovers."
        )
    )]
    Transient { message: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(edgesync::timeout),
        help("Increase the timeout with --timeout or fmc.timeout in the config file.")
    )]
    Timeout,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(edgesync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Missing required setting {field}")]
    #[diagnostic(
        code(edgesync::missing_setting),
        help(
            "Set it in {path}, through EDGESYNC_* environment variables,\n\
             or create a config with: edgesync config init"
        )
    )]
    MissingSetting { field: String, path: String },

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(edgesync::no_config),
        help("Create one with: edgesync config init --config {path}")
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(edgesync::config))]
    Config(ConfigError),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Source { .. } => exit_code::SOURCE,
            Self::PartialApply { .. } => exit_code::PARTIAL_APPLY,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::MissingSetting { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            Self::ApiError { .. } | Self::Transient { .. } | Self::Config(_) => {
                exit_code::GENERAL
            }
        }
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Fetch(source) => CliError::Source { source },

            CoreError::Apply(source) => CliError::PartialApply {
                object_id: source.object_id.clone(),
                direction: source.direction,
                batch_index: source.batch_index,
                applied: source.progress.add.succeeded + source.progress.remove.succeeded,
                remaining: source.remaining_batches(),
                source,
            },

            CoreError::ObjectStore { source, .. } if source.is_auth_expired() => {
                CliError::AuthFailed { message }
            }

            CoreError::ObjectStore { source, .. } if source.is_transient() => {
                CliError::Transient { message }
            }

            CoreError::ObjectNotFound { name } => CliError::NotFound { name },

            CoreError::InvalidAddress(e) => CliError::Validation {
                field: "address".into(),
                reason: e.to_string(),
            },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::ObjectStore { .. } | CoreError::Api { .. } => {
                CliError::ApiError { message }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { field } => CliError::MissingSetting {
                field,
                path: edgesync_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            other => CliError::Config(other),
        }
    }
}
