//! Google OAuth 2.0 / OpenID Connect provider.

use crate::error::AuthError;
use crate::provider::{IdentityProvider, ProviderProfile};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use todo_core::GoogleConfig;
use url::Url;

const SCOPES: &str = "openid email profile";

pub struct GoogleProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: Url,
    token_url: Url,
    userinfo_url: Url,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Raw userinfo payload; only the consumed fields are declared.
#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl GoogleProvider {
    pub fn new(cfg: &GoogleConfig) -> Result<Self, AuthError> {
        let client_secret = cfg
            .resolve_client_secret()
            .ok_or_else(|| AuthError::Config("google client secret is not set".to_string()))?;
        let timeout = cfg.timeout().map_err(|e| AuthError::Config(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Config(format!("http client: {e}")))?;

        Ok(Self {
            http,
            client_id: cfg.client_id.clone(),
            client_secret,
            redirect_uri: cfg.redirect_uri.clone(),
            auth_url: parse_url("auth_url", &cfg.auth_url)?,
            token_url: parse_url("token_url", &cfg.token_url)?,
            userinfo_url: parse_url("userinfo_url", &cfg.userinfo_url)?,
        })
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, AuthError> {
    Url::parse(raw).map_err(|e| AuthError::Config(format!("auth.google.{field} '{raw}': {e}")))
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorize_url(&self, state: &str) -> Url {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("access_type", "online")
            .append_pair("prompt", "select_account")
            .append_pair("state", state);
        url
    }

    async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        let resp = self
            .http
            .post(self.token_url.clone())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(format!("token endpoint: {e}")))?;

        let status = resp.status();
        if status.is_server_error() {
            return Err(AuthError::ProviderUnavailable(format!("token endpoint returned {status}")));
        }
        if !status.is_success() {
            let body: TokenErrorResponse = resp.json().await.unwrap_or_default();
            tracing::warn!(%status, error = %body.error, "authorization code rejected");
            let detail = body
                .error_description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| body.error.clone());
            return Err(AuthError::InvalidGrant(if detail.is_empty() {
                format!("token endpoint returned {status}")
            } else {
                detail
            }));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(format!("malformed token response: {e}")))?;
        Ok(token.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, AuthError> {
        let resp = self
            .http
            .get(self.userinfo_url.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(format!("userinfo endpoint: {e}")))?;

        match resp.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AuthError::InvalidGrant("access token rejected by userinfo".to_string()));
            }
            s => {
                return Err(AuthError::ProviderUnavailable(format!("userinfo endpoint returned {s}")));
            }
        }

        let info: UserInfo = resp
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(format!("malformed userinfo: {e}")))?;
        profile_from_userinfo(info)
    }
}

fn profile_from_userinfo(info: UserInfo) -> Result<ProviderProfile, AuthError> {
    let sub = info.sub.trim().to_string();
    if sub.is_empty() {
        return Err(AuthError::InvalidGrant("userinfo has no subject".to_string()));
    }
    let email = info.email.unwrap_or_default();
    let name = info
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.clone());
    Ok(ProviderProfile { sub, email, name })
}
