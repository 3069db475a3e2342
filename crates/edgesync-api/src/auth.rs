// FMC token authentication
//
// FMC issues access tokens from `POST /api/fmc_platform/v1/auth/generatetoken`
// using HTTP basic auth. The token and the global domain UUID come back as
// response headers, not in the body. Tokens live 30 minutes, which is far
// longer than a reconciliation run, so no refresh flow is needed.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{ACCESS_TOKEN_HEADER, FmcClient};
use crate::error::Error;

const TOKEN_PATH: &str = "/api/fmc_platform/v1/auth/generatetoken";
const DOMAIN_UUID_HEADER: &str = "DOMAIN_UUID";

/// Username/password for the FMC API user.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Session material captured from a successful token request.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub access_token: SecretString,
    pub domain_uuid: String,
}

impl FmcClient {
    /// Request an access token and store it on the client.
    ///
    /// The returned domain UUID is pinned unless one was already set
    /// (an explicit domain override from configuration wins).
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthToken, Error> {
        let url = self.platform_url(TOKEN_PATH)?;
        debug!("requesting access token at {url}");

        let resp = self
            .http()
            .post(url)
            .basic_auth(
                &credentials.username,
                Some(credentials.password.expose_secret()),
            )
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("token request failed (HTTP {status}): {body}"),
            });
        }

        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };

        let access_token = header(ACCESS_TOKEN_HEADER).ok_or_else(|| Error::Authentication {
            message: format!("response is missing the {ACCESS_TOKEN_HEADER} header"),
        })?;
        let domain_uuid = header(DOMAIN_UUID_HEADER).ok_or_else(|| Error::Authentication {
            message: format!("response is missing the {DOMAIN_UUID_HEADER} header"),
        })?;

        let access_token = SecretString::from(access_token);
        self.set_access_token(access_token.clone());
        if self.domain_uuid().is_none() {
            self.set_domain_uuid(domain_uuid.clone());
        }

        debug!(domain = %domain_uuid, "token request successful");
        Ok(AuthToken {
            access_token,
            domain_uuid,
        })
    }
}
