// ── Address canonicalization ──
//
// Every address that enters a comparison (desired or observed) passes
// through `canonicalize` first, so set membership is decided on one
// textual form per network.

use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// A set of canonical addresses, iterated in canonical-string order.
pub type AddressSet = BTreeSet<CanonicalAddress>;

/// A network in canonical CIDR notation, e.g. `203.0.113.4/32` or
/// `2001:db8::/128`.
///
/// Only constructed through [`canonicalize`], so host bits are always
/// masked, bare addresses are always widened to a full-length prefix,
/// and IPv6 is always in compressed form. Ordering is by the canonical
/// string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalAddress(String);

impl CanonicalAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_ipv6(&self) -> bool {
        self.0.contains(':')
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CanonicalAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        canonicalize(s)
    }
}

/// A token that is neither an IP address nor a CIDR block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not an IP address or CIDR block: {token:?}")]
pub struct AddressParseError {
    pub token: String,
}

/// Parse a raw address token into its canonical CIDR form.
///
/// Tokens containing `/` are parsed as networks with host bits masked off
/// (`10.1.2.3/8` becomes `10.0.0.0/8`). Anything else must be a single
/// address and is widened to `/32` or `/128`.
pub fn canonicalize(token: &str) -> Result<CanonicalAddress, AddressParseError> {
    let trimmed = token.trim();

    let net = if trimmed.contains('/') {
        trimmed.parse::<IpNet>().ok().map(|net| net.trunc())
    } else {
        trimmed.parse::<IpAddr>().ok().map(IpNet::from)
    };

    net.map(|net| CanonicalAddress(net.to_string()))
        .ok_or_else(|| AddressParseError {
            token: token.to_owned(),
        })
}

/// Canonicalize a batch of tokens, logging and skipping the invalid ones.
///
/// `origin` names where the tokens came from (a URL or an object id) so a
/// skipped token can be traced back.
pub fn canonicalize_lenient<'a, I>(tokens: I, origin: &str) -> AddressSet
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .filter_map(|token| match canonicalize(token) {
            Ok(addr) => Some(addr),
            Err(e) => {
                warn!(origin, token, "ignoring invalid address: {e}");
                None
            }
        })
        .collect()
}
