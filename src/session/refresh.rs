//! Token refresh for the stored session.
//!
//! Only runs when a client asks for it; there is no background timer.

use tracing::{error, info};

use super::state::TokenSet;
use crate::error::AppError;
use crate::AppState;

/// Exchange the stored refresh token for a new token pair.
///
/// On success the whole token set is replaced (the realm id carries over) and
/// the connection rebuilt. On failure the stored session is left untouched.
pub async fn refresh(state: &AppState) -> Result<TokenSet, AppError> {
    let current = state
        .session
        .tokens()
        .await
        .filter(|t| !t.refresh_token.is_empty())
        .ok_or_else(|| AppError::NotAuthenticated("No refresh token available".into()))?;

    let grant = match state.provider.refresh_token(&current.refresh_token).await {
        Ok(grant) => grant,
        Err(e) => {
            error!(
                "Failed to refresh {} token for realm {}: {e}",
                state.provider.id(),
                current.realm_id
            );
            return Err(match e {
                AppError::Refresh(_) => e,
                other => AppError::Refresh(other.to_string()),
            });
        }
    };

    let tokens = TokenSet::from_grant(grant, current.realm_id);
    let connection = state.connect(&tokens);
    state.session.establish(tokens.clone(), connection).await;

    info!("Refreshed {} token for realm {}", state.provider.id(), tokens.realm_id);
    Ok(tokens)
}
