// ── Edge-server list fetching ──
//
// List endpoints answer in whatever format they like regardless of the
// Accept header, so each body is probed as XML, then JSON, then plain
// lines. The first format that yields at least one token wins.

use edgesync_api::{EdgeListClient, TransportConfig};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::Value;
use strum::Display;
use thiserror::Error;
use tracing::{debug, info};

use crate::address::{AddressSet, canonicalize_lenient};
use crate::config::SourceConfig;

/// Why the desired set could not be built.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch address list from {url}: {source}")]
    Endpoint {
        url: String,
        #[source]
        source: edgesync_api::Error,
    },

    #[error("No addresses retrieved from {endpoints} list source(s)")]
    Empty { endpoints: usize },
}

/// The body format a list was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ListFormat {
    Xml,
    Json,
    Plaintext,
}

/// Split a list body into raw address tokens.
pub fn extract_tokens(body: &str) -> (ListFormat, Vec<String>) {
    if let Some(tokens) = xml_strings(body) {
        return (ListFormat::Xml, tokens);
    }
    if let Some(tokens) = json_scalars(body) {
        return (ListFormat::Json, tokens);
    }
    (ListFormat::Plaintext, plaintext_lines(body))
}

/// Text of every `<string>` element, in any namespace.
///
/// `<ArrayOfstring xmlns="..."><string>1.2.3.4</string>...</ArrayOfstring>`
fn xml_strings(body: &str) -> Option<Vec<String>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut tokens = Vec::new();
    let mut in_string = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"string" => in_string = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"string" => in_string = false,
            Ok(Event::Text(text)) if in_string => push_token(&mut tokens, &text.unescape().ok()?),
            Ok(Event::CData(data)) if in_string => push_token(&mut tokens, &data.decode().ok()?),
            Ok(Event::Eof) => break,
            Err(_) => return None,
            Ok(_) => {}
        }
    }

    (!tokens.is_empty()).then_some(tokens)
}

fn push_token(tokens: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        tokens.push(value.to_owned());
    }
}

/// A top-level JSON array of scalars. Nulls and nested values are skipped.
fn json_scalars(body: &str) -> Option<Vec<String>> {
    let Value::Array(items) = serde_json::from_str::<Value>(body).ok()? else {
        return None;
    };

    let tokens: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_owned()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        })
        .filter(|token| !token.is_empty())
        .collect();

    (!tokens.is_empty()).then_some(tokens)
}

fn plaintext_lines(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Builds the desired address set from the configured list endpoints.
pub struct SourceListFetcher {
    client: EdgeListClient,
}

impl SourceListFetcher {
    pub fn new(client: EdgeListClient) -> Self {
        Self { client }
    }

    /// Build a fetcher with its own HTTP client from `sources.tls` and
    /// `sources.timeout`.
    pub fn from_config(sources: &SourceConfig) -> Result<Self, edgesync_api::Error> {
        let transport = TransportConfig {
            tls: sources.tls.mode(),
            timeout: sources.timeout,
        };
        Ok(Self::new(EdgeListClient::new(&transport)?))
    }

    /// Fetch every endpoint in order and union the canonicalized results.
    ///
    /// The first failing endpoint aborts the fetch; a partial desired set
    /// would make reconciliation remove live addresses.
    pub async fn fetch(&self, sources: &SourceConfig) -> Result<AddressSet, FetchError> {
        let endpoints = sources.endpoints();
        let mut desired = AddressSet::new();

        for url in &endpoints {
            info!(%url, "fetching edge-server list");
            let body = self
                .client
                .fetch_text(url)
                .await
                .map_err(|source| FetchError::Endpoint {
                    url: url.to_string(),
                    source,
                })?;

            let (format, tokens) = extract_tokens(&body);
            let before = desired.len();
            desired.extend(canonicalize_lenient(
                tokens.iter().map(String::as_str),
                url.as_str(),
            ));

            debug!(%url, %format, tokens = tokens.len(), "parsed list body");
            info!(
                %url,
                new = desired.len() - before,
                total = desired.len(),
                "edge-server list merged"
            );
        }

        if desired.is_empty() {
            return Err(FetchError::Empty {
                endpoints: endpoints.len(),
            });
        }
        Ok(desired)
    }
}
