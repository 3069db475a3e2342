// Edge-server list client
//
// Plain unauthenticated GETs against CDN list endpoints. The body format is
// not negotiated reliably, so the raw text is returned and format detection
// happens in core.

use reqwest::header::ACCEPT;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// The `Accept` header sent to list sources.
pub const LIST_ACCEPT: &str = "application/xml, application/json, text/plain";

/// HTTP client for CDN edge-server lists.
pub struct EdgeListClient {
    http: reqwest::Client,
}

impl EdgeListClient {
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch a list body as text. Any non-2xx status is an error.
    pub async fn fetch_text(&self, url: &Url) -> Result<String, Error> {
        debug!("GET {url}");

        let resp = self
            .http
            .get(url.clone())
            .header(ACCEPT, LIST_ACCEPT)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::SourceStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        debug!(bytes = body.len(), "list body received");
        Ok(body)
    }
}
