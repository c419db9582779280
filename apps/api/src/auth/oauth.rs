//! Google sign-in via the OAuth 2.0 authorization-code flow.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::user::Role;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: &str = "openid email profile";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("invalid URL: {0}")]
    Url(String),

    #[error("provider returned no email address")]
    MissingEmail,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// The subset of the OpenID userinfo document the portal uses.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleIdentity {
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

#[derive(Clone)]
pub struct GoogleOAuth {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl GoogleOAuth {
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_url: String,
    ) -> Result<Self, OAuthError> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            client,
            client_id,
            client_secret,
            redirect_url,
        })
    }

    /// Consent-screen URL. `state` round-trips back to the callback and
    /// carries the role hint.
    pub fn authorize_url(&self, state: &str) -> Result<Url, OAuthError> {
        Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
                ("access_type", "online"),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| OAuthError::Url(e.to_string()))
    }

    /// Trades an authorization code for the signed-in user's identity.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleIdentity, OAuthError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;
        let token: TokenResponse = ensure_success(response).await?.json().await?;
        debug!("Google authorization code exchanged");

        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;
        let identity: GoogleIdentity = ensure_success(response).await?.json().await?;

        match identity.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => Ok(identity),
            _ => Err(OAuthError::MissingEmail),
        }
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, OAuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(OAuthError::Provider {
        status: status.as_u16(),
        message,
    })
}

/// Role granted to an account first seen through Google sign-in.
pub fn role_for_state(state: Option<&str>) -> Role {
    match state.map(str::trim) {
        Some(s) if s.eq_ignore_ascii_case("hr") => Role::Hr,
        _ => Role::Candidate,
    }
}
