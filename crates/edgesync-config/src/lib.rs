//! Configuration for edgesync.
//!
//! One TOML file (`[fmc]` + `[sync]`), `EDGESYNC_*` environment overrides,
//! the environment names older deployments already export, and password
//! resolution through env, keyring, or plaintext. The result is translated
//! into an `edgesync_core::SyncConfig`; the CLI applies flag overrides on
//! the loaded [`Config`] before that step.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
    util::bool_from_str_or_int,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use edgesync_core::config::{
    BUNNY_IPV4_URL, BUNNY_IPV6_URL, DEFAULT_BATCH_SIZE, DEFAULT_JOB_DESCRIPTION,
    DEFAULT_OBJECT_NAME, DEFAULT_TIMEOUT,
};
use edgesync_core::{ConnectionConfig, SourceConfig, SyncConfig, TlsVerification};

/// Keyring service name for stored FMC passwords.
pub const KEYRING_SERVICE: &str = "edgesync";

/// Env var checked for the password after `fmc.password_env`.
pub const PASSWORD_ENV: &str = "EDGESYNC_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting '{field}'")]
    Missing { field: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub fmc: FmcSection,
    #[serde(default)]
    pub sync: SyncSection,
}

/// `[fmc]`: where the management center lives and how to log in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FmcSection {
    /// Base URL (e.g., "https://fmc.example.net").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Plaintext password (prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Skip TLS certificate verification.
    #[serde(default, deserialize_with = "bool_from_str_or_int")]
    pub insecure: bool,

    /// Inverse of `insecure`, as exported by older deployments.
    #[serde(default = "default_true", deserialize_with = "bool_from_str_or_int")]
    pub verify_ssl: bool,

    /// Path to a custom CA certificate (PEM).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Pin a domain instead of the global domain returned at login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_uuid: Option<String>,
}

impl Default for FmcSection {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            password_env: None,
            insecure: false,
            verify_ssl: true,
            ca_cert: None,
            timeout: default_timeout(),
            domain_uuid: None,
        }
    }
}

/// `[sync]`: which object to manage and where its addresses come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SyncSection {
    #[serde(default = "default_object_name")]
    pub object_name: String,

    #[serde(default = "default_description")]
    pub description: String,

    #[serde(default = "default_ipv4_url")]
    pub ipv4_url: String,

    #[serde(default = "default_ipv6_url")]
    pub ipv6_url: String,

    #[serde(default, deserialize_with = "bool_from_str_or_int")]
    pub include_ipv6: bool,

    #[serde(default, deserialize_with = "bool_from_str_or_int")]
    pub dry_run: bool,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// List-source timeout in seconds.
    #[serde(default = "default_timeout")]
    pub source_timeout: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            object_name: default_object_name(),
            description: default_description(),
            ipv4_url: default_ipv4_url(),
            ipv6_url: default_ipv6_url(),
            include_ipv6: false,
            dry_run: false,
            batch_size: default_batch_size(),
            source_timeout: default_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}
fn default_object_name() -> String {
    DEFAULT_OBJECT_NAME.into()
}
fn default_description() -> String {
    DEFAULT_JOB_DESCRIPTION.into()
}
fn default_ipv4_url() -> String {
    BUNNY_IPV4_URL.into()
}
fn default_ipv6_url() -> String {
    BUNNY_IPV6_URL.into()
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "edgesync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("edgesync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Environment names used by the standalone sync scripts this tool
/// replaces. `EDGESYNC_*` variables take precedence over these.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("WINGPY_FMC_BASE_URL", "fmc.url"),
    ("WINGPY_FMC_USERNAME", "fmc.username"),
    ("WINGPY_FMC_PASSWORD", "fmc.password"),
    ("VERIFY_SSL", "fmc.verify_ssl"),
    ("FMC_DYNAMIC_NAME", "sync.object_name"),
    ("INCLUDE_IPV6", "sync.include_ipv6"),
    ("DRY_RUN", "sync.dry_run"),
    ("CHUNK_SIZE", "sync.batch_size"),
];

fn legacy_env() -> Env {
    Env::raw().filter_map(|key| {
        LEGACY_ENV
            .iter()
            .find(|(name, _)| key == *name)
            .map(|(_, path)| (*path).into())
    })
}

/// Layered figment: defaults, TOML file, legacy env names, `EDGESYNC_*`.
///
/// `EDGESYNC_FMC__URL` sets `fmc.url`; the double underscore separates
/// sections because keys themselves contain single underscores.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file_exact(path))
        .merge(legacy_env())
        .merge(Env::prefixed("EDGESYNC_").split("__"))
}

/// Load the config from `path_override` (which must exist) or the
/// default location (which may not).
pub fn load_config(path_override: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path_override {
        Some(path) if !path.exists() => {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Some(path) => path.to_path_buf(),
        None => config_path(),
    };

    Ok(figment(&path).extract()?)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(username: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{username}/password"))
}

/// Store an FMC password in the system keyring.
pub fn store_password(username: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(username)?.set_password(password)?;
    Ok(())
}

/// Resolve the FMC password from the credential chain.
///
/// Order: `fmc.password_env`, `EDGESYNC_PASSWORD`, the system keyring,
/// then the plaintext `fmc.password`.
pub fn resolve_password(fmc: &FmcSection) -> Result<SecretString, ConfigError> {
    // 1. Configured env var name
    if let Some(ref env_name) = fmc.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Well-known env var
    if let Ok(val) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Some(ref username) = fmc.username {
        if let Ok(pw) = keyring_entry(username).and_then(|entry| entry.get_password()) {
            return Ok(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = fmc.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::Missing {
        field: "fmc.password".into(),
    })
}

fn require<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ConfigError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::Missing {
            field: field.into(),
        })
}

fn parse_url(value: &str, field: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{value}': {e}"),
    })
}

/// One TLS policy for every HTTPS request the run makes.
fn tls_verification(fmc: &FmcSection) -> TlsVerification {
    if fmc.insecure || !fmc.verify_ssl {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = fmc.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// The list-source half of the config. Needs no FMC credentials.
pub fn to_source_config(cfg: &Config) -> Result<SourceConfig, ConfigError> {
    Ok(SourceConfig {
        primary_url: parse_url(&cfg.sync.ipv4_url, "sync.ipv4_url")?,
        secondary_url: parse_url(&cfg.sync.ipv6_url, "sync.ipv6_url")?,
        include_secondary: cfg.sync.include_ipv6,
        tls: tls_verification(&cfg.fmc),
        timeout: Duration::from_secs(cfg.sync.source_timeout),
    })
}

/// Build a validated `SyncConfig` from the loaded file + env layers.
pub fn to_sync_config(cfg: &Config) -> Result<SyncConfig, ConfigError> {
    let url = parse_url(require(cfg.fmc.url.as_deref(), "fmc.url")?, "fmc.url")?;
    let username = require(cfg.fmc.username.as_deref(), "fmc.username")?.to_owned();
    let password = resolve_password(&cfg.fmc)?;

    let sync = SyncConfig {
        connection: ConnectionConfig {
            url,
            username,
            password,
            tls: tls_verification(&cfg.fmc),
            timeout: Duration::from_secs(cfg.fmc.timeout),
            domain_uuid: cfg.fmc.domain_uuid.clone(),
        },
        sources: to_source_config(cfg)?,
        object_name: require(Some(&cfg.sync.object_name), "sync.object_name")?.to_owned(),
        description: cfg.sync.description.clone(),
        dry_run: cfg.sync.dry_run,
        batch_size: cfg.sync.batch_size,
    };

    sync.validate().map_err(|e| ConfigError::Validation {
        field: "config".into(),
        reason: e.to_string(),
    })?;
    Ok(sync)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const FULL_TOML: &str = r#"
        [fmc]
        url = "https://fmc.example.net"
        username = "api-user"
        password = "from-file"
        timeout = 30

        [sync]
        object_name = "Edge_Servers"
        include_ipv6 = true
        batch_size = 250
    "#;

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "")?;
            let cfg = load_config(Some(Path::new("config.toml"))).unwrap();

            assert_eq!(cfg, Config::default());
            assert_eq!(cfg.sync.ipv4_url, BUNNY_IPV4_URL);
            assert_eq!(cfg.sync.batch_size, 500);
            assert!(cfg.fmc.verify_ssl);
            Ok(())
        });
    }

    #[test]
    fn file_values_are_loaded() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", FULL_TOML)?;
            let cfg = load_config(Some(Path::new("config.toml"))).unwrap();

            assert_eq!(cfg.fmc.url.as_deref(), Some("https://fmc.example.net"));
            assert_eq!(cfg.fmc.timeout, 30);
            assert_eq!(cfg.sync.object_name, "Edge_Servers");
            assert!(cfg.sync.include_ipv6);
            assert_eq!(cfg.sync.batch_size, 250);
            Ok(())
        });
    }

    #[test]
    fn prefixed_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", FULL_TOML)?;
            jail.set_env("EDGESYNC_SYNC__BATCH_SIZE", "100");
            jail.set_env("EDGESYNC_FMC__URL", "https://other.example.net");

            let cfg = load_config(Some(Path::new("config.toml"))).unwrap();
            assert_eq!(cfg.sync.batch_size, 100);
            assert_eq!(cfg.fmc.url.as_deref(), Some("https://other.example.net"));
            Ok(())
        });
    }

    #[test]
    fn legacy_env_names_are_honored() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "")?;
            jail.set_env("WINGPY_FMC_BASE_URL", "https://legacy.example.net");
            jail.set_env("WINGPY_FMC_USERNAME", "legacy-user");
            jail.set_env("FMC_DYNAMIC_NAME", "Legacy_Object");
            jail.set_env("INCLUDE_IPV6", "1");
            jail.set_env("DRY_RUN", "true");
            jail.set_env("CHUNK_SIZE", "50");
            jail.set_env("VERIFY_SSL", "false");

            let cfg = load_config(Some(Path::new("config.toml"))).unwrap();
            assert_eq!(cfg.fmc.url.as_deref(), Some("https://legacy.example.net"));
            assert_eq!(cfg.fmc.username.as_deref(), Some("legacy-user"));
            assert_eq!(cfg.sync.object_name, "Legacy_Object");
            assert!(cfg.sync.include_ipv6);
            assert!(cfg.sync.dry_run);
            assert_eq!(cfg.sync.batch_size, 50);
            assert!(!cfg.fmc.verify_ssl);
            Ok(())
        });
    }

    #[test]
    fn prefixed_env_beats_legacy_env() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "")?;
            jail.set_env("FMC_DYNAMIC_NAME", "Legacy_Object");
            jail.set_env("EDGESYNC_SYNC__OBJECT_NAME", "New_Object");

            let cfg = load_config(Some(Path::new("config.toml"))).unwrap();
            assert_eq!(cfg.sync.object_name, "New_Object");
            Ok(())
        });
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let result = load_config(Some(Path::new("nope.toml")));
            assert!(matches!(result, Err(ConfigError::NotFound { .. })));
            Ok(())
        });
    }

    #[test]
    fn password_env_takes_precedence() {
        Jail::expect_with(|jail| {
            jail.set_env("MY_FMC_SECRET", "from-custom-env");
            jail.set_env(PASSWORD_ENV, "from-default-env");

            let fmc = FmcSection {
                password_env: Some("MY_FMC_SECRET".into()),
                password: Some("from-file".into()),
                ..FmcSection::default()
            };
            assert_eq!(resolve_password(&fmc).unwrap().expose_secret(), "from-custom-env");

            let fmc = FmcSection {
                password: Some("from-file".into()),
                ..FmcSection::default()
            };
            assert_eq!(resolve_password(&fmc).unwrap().expose_secret(), "from-default-env");
            Ok(())
        });
    }

    #[test]
    fn sync_config_from_full_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", FULL_TOML)?;
            jail.set_env(PASSWORD_ENV, "pw");
            let cfg = load_config(Some(Path::new("config.toml"))).unwrap();
            let sync = to_sync_config(&cfg).unwrap();

            assert_eq!(sync.connection.url.as_str(), "https://fmc.example.net/");
            assert_eq!(sync.connection.username, "api-user");
            assert_eq!(sync.connection.timeout, Duration::from_secs(30));
            assert_eq!(sync.connection.tls, TlsVerification::SystemDefaults);
            assert_eq!(sync.object_name, "Edge_Servers");
            assert_eq!(sync.sources.endpoints().len(), 2);
            assert_eq!(sync.batch_size, 250);
            Ok(())
        });
    }

    #[test]
    fn missing_url_is_reported_by_name() {
        let cfg = Config::default();
        match to_sync_config(&cfg) {
            Err(ConfigError::Missing { field }) => assert_eq!(field, "fmc.url"),
            other => panic!("expected Missing, got: {other:?}"),
        }
    }

    #[test]
    fn verify_ssl_false_disables_verification() {
        Jail::expect_with(|jail| {
            jail.set_env(PASSWORD_ENV, "pw");
            let mut cfg = Config::default();
            cfg.fmc.url = Some("https://fmc.example.net".into());
            cfg.fmc.username = Some("api".into());
            cfg.fmc.verify_ssl = false;

            let sync = to_sync_config(&cfg).unwrap();
            assert_eq!(sync.connection.tls, TlsVerification::DangerAcceptInvalid);
            assert_eq!(sync.sources.tls, TlsVerification::DangerAcceptInvalid);
            Ok(())
        });
    }

    #[test]
    fn source_config_follows_verify_ssl_without_credentials() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "")?;
            jail.set_env("VERIFY_SSL", "false");
            let cfg = load_config(Some(Path::new("config.toml"))).unwrap();

            let sources = to_source_config(&cfg).unwrap();
            assert_eq!(sources.tls, TlsVerification::DangerAcceptInvalid);
            assert_eq!(
                to_source_config(&Config::default()).unwrap().tls,
                TlsVerification::SystemDefaults
            );
            Ok(())
        });
    }

    #[test]
    fn zero_batch_size_is_invalid() {
        Jail::expect_with(|jail| {
            jail.set_env(PASSWORD_ENV, "pw");
            let mut cfg = Config::default();
            cfg.fmc.url = Some("https://fmc.example.net".into());
            cfg.fmc.username = Some("api".into());
            cfg.sync.batch_size = 0;

            assert!(matches!(
                to_sync_config(&cfg),
                Err(ConfigError::Validation { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn save_then_load_preserves_values() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("nested/config.toml");
            let mut cfg = Config::default();
            cfg.fmc.url = Some("https://fmc.example.net".into());
            cfg.sync.include_ipv6 = true;

            save_config(&cfg, &path).unwrap();
            assert_eq!(load_config(Some(path.as_path())).unwrap(), cfg);
            Ok(())
        });
    }
}
