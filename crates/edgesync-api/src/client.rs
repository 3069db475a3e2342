// FMC REST client
//
// Wraps `reqwest::Client` with token injection, domain-scoped URL
// construction, and FMC error-envelope parsing. Endpoint groups
// (dynamic objects, auth) live in sibling modules as inherent methods
// to keep this module focused on transport mechanics.

use std::future::Future;
use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::Page;
use crate::transport::TransportConfig;

pub(crate) const ACCESS_TOKEN_HEADER: &str = "X-auth-access-token";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

// ── Error response shape from FMC ────────────────────────────────────
//
// {"error":{"category":"FRAMEWORK","messages":[{"description":"..."}],"severity":"ERROR"}}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    messages: Vec<ErrorMessage>,
}

#[derive(serde::Deserialize)]
struct ErrorMessage {
    #[serde(default)]
    description: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the FMC REST API.
///
/// Holds the access token and the domain UUID captured at login. Every
/// config-API path is relative to `/api/fmc_config/v1/domain/{domainUUID}/`,
/// so callers pass only the object path (e.g. `"object/dynamicobjects"`).
pub struct FmcClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: RwLock<Option<SecretString>>,
    domain_uuid: RwLock<Option<String>>,
}

impl FmcClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Create a client from a `TransportConfig`. Call
    /// [`login`](Self::login) before issuing config-API requests.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Wrap an existing `reqwest::Client` (caller manages TLS/timeouts).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            access_token: RwLock::new(None),
            domain_uuid: RwLock::new(None),
        }
    }

    /// The FMC base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client (for the token flow).
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Session state ────────────────────────────────────────────────

    /// Store the access token used on every subsequent request.
    pub fn set_access_token(&self, token: SecretString) {
        debug!("storing FMC access token");
        if let Ok(mut guard) = self.access_token.write() {
            *guard = Some(token);
        }
    }

    /// Pin the domain the config-API paths are scoped to.
    pub fn set_domain_uuid(&self, uuid: impl Into<String>) {
        if let Ok(mut guard) = self.domain_uuid.write() {
            *guard = Some(uuid.into());
        }
    }

    /// The domain UUID currently in use, if any.
    pub fn domain_uuid(&self) -> Option<String> {
        self.domain_uuid.read().ok().and_then(|g| g.clone())
    }

    fn apply_token(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self
            .access_token
            .read()
            .ok()
            .and_then(|g| g.as_ref().map(|t| t.expose_secret().to_owned()));
        match token {
            Some(token) => builder.header(ACCESS_TOKEN_HEADER, token),
            None => builder,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join an absolute API path (e.g. the token endpoint) onto the base URL.
    pub(crate) fn platform_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// Build a domain-scoped config URL:
    /// `{base}/api/fmc_config/v1/domain/{domainUUID}/{path}`
    pub(crate) fn config_url(&self, path: &str) -> Result<Url, Error> {
        let domain = self.domain_uuid().ok_or_else(|| Error::Authentication {
            message: "no domain UUID available -- log in first".into(),
        })?;
        let path = path.trim_start_matches('/');
        self.platform_url(&format!("/api/fmc_config/v1/domain/{domain}/{path}"))
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.config_url(path)?;
        debug!("GET {url}");

        let resp = self.apply_token(self.http.get(url)).send().await?;
        self.handle_response(resp).await
    }

    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.config_url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self
            .apply_token(self.http.get(url).query(params))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.config_url(path)?;
        debug!("POST {url}");

        let resp = self.apply_token(self.http.post(url).json(body)).send().await?;
        self.handle_response(resp).await
    }

    pub async fn post_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.config_url(path)?;
        debug!("POST {url}");

        let resp = self.apply_token(self.http.post(url).json(body)).send().await?;
        self.handle_empty(resp).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.config_url(path)?;
        debug!("PUT {url}");

        let resp = self.apply_token(self.http.put(url).json(body)).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            trace!(bytes = body.len(), "response body received");
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::SessionExpired;
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Error::RateLimited { retry_after_secs };
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            let message = err
                .error
                .messages
                .into_iter()
                .filter_map(|m| m.description)
                .collect::<Vec<_>>()
                .join("; ");
            Error::Api {
                status: status.as_u16(),
                message: if message.is_empty() {
                    status.to_string()
                } else {
                    message
                },
                category: err.error.category,
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.chars().take(200).collect()
                },
                category: None,
            }
        }
    }

    // ── Pagination helper ────────────────────────────────────────────

    /// Collect all pages into a single `Vec<T>`.
    ///
    /// Advances `offset` by the page size until a short page comes back.
    pub async fn paginate_all<T, F, Fut>(&self, limit: usize, fetch: F) -> Result<Vec<T>, Error>
    where
        F: Fn(usize, usize) -> Fut,
        Fut: Future<Output = Result<Page<T>, Error>>,
    {
        let mut all = Vec::new();
        let mut offset = 0;

        loop {
            let page = fetch(offset, limit).await?;
            let received = page.items.len();
            all.extend(page.items);

            if received == 0 || received < limit {
                break;
            }

            offset += limit;
        }

        Ok(all)
    }
}
