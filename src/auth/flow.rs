//! Authorization-code flow against the configured provider.

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::providers::SCOPE_ACCOUNTING;
use crate::session::TokenSet;
use crate::AppState;

/// Query parameters the provider appends to the redirect URI.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "realmId")]
    pub realm_id: Option<String>,
    /// Set instead of `code` when the user declines or the request is invalid.
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Build the provider URL the user is redirected to.
pub async fn begin_authorization(state: &AppState) -> String {
    let url = state.provider.auth_url(
        &[SCOPE_ACCOUNTING],
        &state.config.oauth_state,
        &state.config.redirect_uri,
    );
    state.session.mark_awaiting_callback().await;
    url
}

/// Validate the callback, exchange its code, and install the resulting tokens.
///
/// Nothing is stored on failure.
pub async fn complete_authorization(
    state: &AppState,
    params: CallbackParams,
) -> Result<TokenSet, AppError> {
    match exchange(state, params).await {
        Ok(tokens) => {
            let connection = state.connect(&tokens);
            state.session.establish(tokens.clone(), connection).await;
            info!("Connected {} realm {}", state.provider.id(), tokens.realm_id);
            Ok(tokens)
        }
        Err(e) => Err(reject_callback(state, e).await),
    }
}

/// Fail the pending authorization: log, drop back to unauthenticated (keeping
/// any existing token set), and hand the error back as an authentication error.
pub async fn reject_callback(state: &AppState, err: AppError) -> AppError {
    let err = match err {
        AppError::Authentication(_) => err,
        other => AppError::Authentication(other.to_string()),
    };
    error!("Error during OAuth callback: {err}");
    state.session.abandon_callback().await;
    err
}

async fn exchange(state: &AppState, params: CallbackParams) -> Result<TokenSet, AppError> {
    if let Some(err) = params.error {
        return Err(AppError::Authentication(match params.error_description {
            Some(desc) => format!("{err}: {desc}"),
            None => err,
        }));
    }

    if params.state.as_deref() != Some(state.config.oauth_state.as_str()) {
        return Err(AppError::Authentication("state parameter mismatch".into()));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Authentication("missing authorization code".into()))?;
    let realm_id = params
        .realm_id
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::Authentication("missing realmId".into()))?;

    let grant = state
        .provider
        .exchange_code(&code, &state.config.redirect_uri)
        .await
        .map_err(|e| match e {
            AppError::Authentication(_) => e,
            other => AppError::Authentication(other.to_string()),
        })?;

    Ok(TokenSet::from_grant(grant, realm_id))
}

/// Revoke the stored refresh token and drop the session.
///
/// Revocation is best effort: the session is cleared either way. Returns
/// whether the provider accepted the revocation.
pub async fn disconnect(state: &AppState) -> Result<bool, AppError> {
    let active = state
        .session
        .clear()
        .await
        .ok_or_else(|| AppError::NotAuthenticated("Not authenticated with QuickBooks".into()))?;

    match state.provider.revoke(&active.tokens.refresh_token).await {
        Ok(()) => {
            info!("Disconnected realm {}", active.tokens.realm_id);
            Ok(true)
        }
        Err(e) => {
            warn!("Token revocation failed for realm {}: {e}", active.tokens.realm_id);
            Ok(false)
        }
    }
}
