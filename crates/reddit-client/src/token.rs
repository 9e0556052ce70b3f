//! Password-grant token exchange
//!
//! Reddit "script" apps authenticate by POSTing the account's username and
//! password to the token endpoint, with the app's client id/secret as HTTP
//! basic auth. The returned bearer token is handed to the browser and sent
//! back on each fetch; the server never stores it.

use common::Secret;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::constants::{DEFAULT_API_URL, DEFAULT_AUTH_URL, DEFAULT_USER_AGENT, TOKEN_PATH};
use crate::error::{Error, Result};

/// Application and account credentials, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub username: String,
    pub password: Secret<String>,
}

/// Upstream base URLs plus the client identifier sent on every call.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub auth_url: String,
    pub api_url: String,
    pub user_agent: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Endpoints {
    pub fn token_url(&self) -> String {
        format!("{}{TOKEN_PATH}", self.auth_url.trim_end_matches('/'))
    }
}

/// Token endpoint response.
///
/// Reddit answers a rejected password grant with `200 OK` and an `error`
/// field instead of a token, so every field is optional.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    /// Seconds until expiry; informational only, expiry is not tracked
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
    pub error: Option<String>,
}

/// Exchange credentials for a bearer token.
#[instrument(skip_all, fields(username = %credentials.username))]
pub async fn fetch_token(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    credentials: &Credentials,
) -> Result<String> {
    let response = client
        .post(endpoints.token_url())
        .basic_auth(
            &credentials.client_id,
            Some(credentials.client_secret.expose()),
        )
        .header(reqwest::header::USER_AGENT, &endpoints.user_agent)
        .form(&[
            ("grant_type", "password"),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.expose().as_str()),
        ])
        .send()
        .await
        .map_err(|e| Error::Auth(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Auth(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let token = response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::Auth(format!("invalid token response: {e}")))?;

    match (token.access_token, token.error) {
        (Some(access_token), _) if !access_token.is_empty() => {
            debug!(expires_in = ?token.expires_in, scope = ?token.scope, "token issued");
            Ok(access_token)
        }
        (_, Some(error)) => Err(Error::Auth(format!("token endpoint rejected grant: {error}"))),
        _ => Err(Error::Auth("token response has no access_token".into())),
    }
}
