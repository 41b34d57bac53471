use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type for the quickbooks-connect service.
///
/// Every variant is isolated to the request that produced it; none is fatal to
/// the server process.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ── OAuth ───────────────────────────────────────────────────────────
    /// Code exchange rejected or the callback was malformed.
    #[error("{0}")]
    Authentication(String),

    /// Operation attempted without an authenticated session.
    #[error("{0}")]
    NotAuthenticated(String),

    #[error("Failed to refresh token: {0}")]
    Refresh(String),

    /// Returned by `OAuthProvider::revoke`. Disconnect treats revocation as
    /// best effort and only logs it, so this never reaches a client.
    #[error("Failed to revoke token: {0}")]
    Revoke(String),

    // ── Accounting API ──────────────────────────────────────────────────
    #[error("{0}")]
    Downstream(String),

    // ── Internal ────────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // The callback is a browser navigation, so it gets plain text.
            AppError::Authentication(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Authentication failed: {msg}"),
            )
                .into_response(),
            AppError::NotAuthenticated(_) => (
                StatusCode::UNAUTHORIZED,
                axum::Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            AppError::Refresh(_)
            | AppError::Revoke(_)
            | AppError::Downstream(_)
            | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
        }
    }
}
