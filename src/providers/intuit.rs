use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::traits::{OAuthProvider, TokenGrant};
use crate::error::AppError;

const AUTHORIZE_URL: &str = "https://appcenter.intuit.com/connect/oauth2";
const TOKEN_URL: &str = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer";
const REVOKE_URL: &str = "https://developer.api.intuit.com/v2/oauth2/tokens/revoke";

/// Scope granting read/write access to QuickBooks Online accounting data.
pub const SCOPE_ACCOUNTING: &str = "com.intuit.quickbooks.accounting";

/// Intuit OAuth 2.0 provider (QuickBooks Online).
///
/// Access tokens live one hour; refresh tokens roughly 100 days and rotate on
/// every refresh, so the returned refresh token must always replace the old one.
/// The token endpoint authenticates the client with HTTP Basic auth.
pub struct IntuitProvider {
    client_id: String,
    client_secret: String,
    http: reqwest::Client,
}

// Raw token response from Intuit's bearer endpoint. `id_token` and friends
// are ignored.
#[derive(Debug, Deserialize)]
struct IntuitTokenResponse {
    token_type: String,
    access_token: String,
    refresh_token: String,
    expires_in: u64,
    x_refresh_token_expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct IntuitErrorResponse {
    error: String,
    error_description: Option<String>,
}

impl From<IntuitTokenResponse> for TokenGrant {
    fn from(resp: IntuitTokenResponse) -> Self {
        TokenGrant {
            token_type: resp.token_type,
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            expires_in: resp.expires_in,
            x_refresh_token_expires_in: resp.x_refresh_token_expires_in,
        }
    }
}

impl IntuitProvider {
    pub fn new(
        client_id: String,
        client_secret: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client_id,
            client_secret,
            http,
        })
    }

    /// POST a grant to the token endpoint. Errors come back as plain messages so
    /// each caller can wrap them in its own variant.
    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenGrant, String> {
        let resp = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(form)
            .send()
            .await
            .map_err(|e| format!("Token request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(error_message(status, &body));
        }

        let token_resp: IntuitTokenResponse = resp
            .json()
            .await
            .map_err(|e| format!("Failed to parse token response: {e}"))?;

        Ok(token_resp.into())
    }
}

#[async_trait]
impl OAuthProvider for IntuitProvider {
    fn id(&self) -> &str {
        "intuit"
    }

    fn auth_url(&self, scopes: &[&str], state: &str, redirect_uri: &str) -> String {
        let scope_str = scopes.join(" ");
        format!(
            "{AUTHORIZE_URL}?\
             client_id={client_id}\
             &response_type=code\
             &scope={scope}\
             &redirect_uri={redirect_uri}\
             &state={state}",
            client_id = urlencoding(&self.client_id),
            scope = urlencoding(&scope_str),
            redirect_uri = urlencoding(redirect_uri),
            state = urlencoding(state),
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenGrant, AppError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .await
        .map_err(AppError::Authentication)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, AppError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
        .map_err(AppError::Refresh)
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let resp = self
            .http
            .post(REVOKE_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&json!({ "token": token }))
            .send()
            .await
            .map_err(|e| AppError::Revoke(format!("Revoke request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Revoke(error_message(status, &body)));
        }

        Ok(())
    }
}

/// Turn an error response from the token endpoint into a readable message.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<IntuitErrorResponse>(body) {
        Ok(IntuitErrorResponse {
            error,
            error_description: Some(desc),
        }) => format!("{status}: {error}: {desc}"),
        Ok(IntuitErrorResponse { error, .. }) => format!("{status}: {error}"),
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!("{status}: {}", body.trim()),
    }
}

/// Simple percent-encoding for URL parameters.
fn urlencoding(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
