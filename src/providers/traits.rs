use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Tokens returned from the provider after a code exchange or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Refresh token lifetime in seconds.
    pub x_refresh_token_expires_in: u64,
}

/// Seam between the OAuth handlers and the provider's endpoints.
///
/// Implementations map provider failures onto the matching `AppError` variant:
/// code exchange onto `Authentication`, refresh onto `Refresh`, revocation onto
/// `Revoke`.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Unique provider identifier (e.g., "intuit").
    fn id(&self) -> &str;

    /// Build the authorization URL that the user should be redirected to.
    fn auth_url(&self, scopes: &[&str], state: &str, redirect_uri: &str) -> String;

    /// Exchange an authorization code for an access/refresh token pair.
    async fn exchange_code(&self, code: &str, redirect_uri: &str)
        -> Result<TokenGrant, AppError>;

    /// Mint a new token pair from a refresh token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, AppError>;

    /// Revoke a refresh token. Not all providers support this.
    async fn revoke(&self, _token: &str) -> Result<(), AppError> {
        Ok(())
    }
}
