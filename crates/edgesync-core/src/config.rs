// ── Runtime sync configuration ──
//
// These types describe one reconciliation run: where the FMC lives, how to
// authenticate, which object to manage, and where the edge lists come from.
// They never touch disk. The CLI builds a `SyncConfig` and hands it in.

use std::time::Duration;

use edgesync_api::TlsMode;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::CoreError;

/// BunnyCDN's IPv4 edge-server list.
pub const BUNNY_IPV4_URL: &str = "https://bunnycdn.com/api/system/edgeserverlist";

/// BunnyCDN's IPv6 edge-server list.
pub const BUNNY_IPV6_URL: &str = "https://bunnycdn.com/api/system/edgeserverlist/ipv6";

/// Mappings per add/remove request.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Name of the managed dynamic object when none is configured.
pub const DEFAULT_OBJECT_NAME: &str = "BunnyCDN_Dynamic";

/// Description given to the dynamic object when the job creates it.
pub const DEFAULT_JOB_DESCRIPTION: &str =
    "Dynamic Object auto-managed from BunnyCDN edge server list.";

/// Per-request timeout for both FMC and list sources.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// TLS verification strategy for the FMC and list-source connections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file, added to the system roots.
    CustomCa(std::path::PathBuf),
    /// Skip verification (FMC appliances with self-signed certs).
    DangerAcceptInvalid,
}

impl TlsVerification {
    pub(crate) fn mode(&self) -> TlsMode {
        match self {
            Self::SystemDefaults => TlsMode::System,
            Self::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            Self::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// How to reach and authenticate against the FMC.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// FMC base URL (e.g., `https://fmc.example.net`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Pin a domain instead of the global domain returned at login.
    pub domain_uuid: Option<String>,
}

/// Where the desired address set comes from.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Always fetched.
    pub primary_url: Url,
    /// Fetched only when `include_secondary` is set (the IPv6 list).
    pub secondary_url: Url,
    pub include_secondary: bool,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl SourceConfig {
    /// Endpoints in fetch order.
    pub fn endpoints(&self) -> Vec<&Url> {
        let mut urls = vec![&self.primary_url];
        if self.include_secondary {
            urls.push(&self.secondary_url);
        }
        urls
    }
}

/// Everything one reconciliation run needs, validated once up front.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub connection: ConnectionConfig,
    pub sources: SourceConfig,
    /// Exact name of the managed dynamic object.
    pub object_name: String,
    /// Description used if the object has to be created.
    pub description: String,
    /// Log create/add/remove instead of sending them.
    pub dry_run: bool,
    /// Upper bound on mappings per add/remove request.
    pub batch_size: usize,
}

impl SyncConfig {
    /// Reject values no run could succeed with.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |message: &str| {
            Err(CoreError::Config {
                message: message.to_owned(),
            })
        };

        if self.object_name.trim().is_empty() {
            return invalid("dynamic object name must not be empty");
        }
        if self.batch_size == 0 {
            return invalid("batch size must be at least 1");
        }
        if self.connection.username.trim().is_empty() {
            return invalid("FMC username must not be empty");
        }
        if self.connection.password.expose_secret().is_empty() {
            return invalid("FMC password must not be empty");
        }
        for url in [&self.connection.url, &self.sources.primary_url, &self.sources.secondary_url] {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(CoreError::Config {
                    message: format!("unsupported URL scheme in {url}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample() -> SyncConfig {
        SyncConfig {
            connection: ConnectionConfig {
                url: Url::parse("https://fmc.example.net").unwrap(),
                username: "api".into(),
                password: SecretString::from("secret".to_owned()),
                tls: TlsVerification::default(),
                timeout: DEFAULT_TIMEOUT,
                domain_uuid: None,
            },
            sources: SourceConfig {
                primary_url: Url::parse(BUNNY_IPV4_URL).unwrap(),
                secondary_url: Url::parse(BUNNY_IPV6_URL).unwrap(),
                include_secondary: false,
                tls: TlsVerification::default(),
                timeout: DEFAULT_TIMEOUT,
            },
            object_name: DEFAULT_OBJECT_NAME.into(),
            description: DEFAULT_JOB_DESCRIPTION.into(),
            dry_run: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[test]
    fn secondary_endpoint_is_opt_in() {
        let mut config = sample();
        assert_eq!(config.sources.endpoints().len(), 1);

        config.sources.include_secondary = true;
        let urls = config.sources.endpoints();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[1].as_str(), BUNNY_IPV6_URL);
    }

    #[test]
    fn sample_config_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = sample();
        config.batch_size = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config { .. })));
    }

    #[test]
    fn blank_object_name_is_rejected() {
        let mut config = sample();
        config.object_name = "   ".into();
        assert!(matches!(config.validate(), Err(CoreError::Config { .. })));
    }

    #[test]
    fn non_http_source_is_rejected() {
        let mut config = sample();
        config.sources.primary_url = Url::parse("ftp://example.net/list").unwrap();
        assert!(matches!(config.validate(), Err(CoreError::Config { .. })));
    }
}
