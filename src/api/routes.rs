//! Route handlers.
//!
//! All handlers receive `SharedState` via Axum state extraction. Session state
//! lives server-side; no route checks client credentials.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::services::{ServeDir, ServeFile};

use crate::auth::{self, CallbackParams};
use crate::error::AppError;
use crate::session;
use crate::SharedState;

pub const AUTH_PATH: &str = "/auth/quickbooks";
pub const DASHBOARD_PATH: &str = "/dashboard";

pub fn router(state: SharedState) -> Router {
    let public_dir = state.config.public_dir.clone();

    Router::new()
        // ── Pages ────────────────────────────────────────────────────────
        .route_service("/", ServeFile::new(public_dir.join("index.html")))
        .route(DASHBOARD_PATH, get(dashboard))
        // ── OAuth ────────────────────────────────────────────────────────
        .route(AUTH_PATH, get(auth_start))
        .route("/callback", get(auth_callback))
        .route("/refresh_token", get(refresh_token))
        .route("/disconnect", post(disconnect))
        // ── API ──────────────────────────────────────────────────────────
        .route("/api/company_info", get(company_info))
        .route("/api/session", get(session_status))
        // ── Health ───────────────────────────────────────────────────────
        .route("/status", get(status))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
}

/// 302 Found, the status browsers expect mid OAuth dance.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

// =============================================================================
// Pages
// =============================================================================

/// GET /dashboard — only for connected sessions.
async fn dashboard(State(state): State<SharedState>) -> Result<Response, AppError> {
    if !state.session.is_authenticated().await {
        return Ok(found(AUTH_PATH));
    }

    let path = state.config.public_dir.join("dashboard.html");
    let page = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| AppError::Internal(format!("{}: {e}", path.display())))?;
    Ok(Html(page).into_response())
}

// =============================================================================
// OAuth
// =============================================================================

/// GET /auth/quickbooks — Redirect the browser to the provider.
async fn auth_start(State(state): State<SharedState>) -> Response {
    let url = auth::begin_authorization(&state).await;
    found(&url)
}

/// GET /callback — Provider redirect target.
async fn auth_callback(
    State(state): State<SharedState>,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            let err = AppError::Authentication(rejection.body_text());
            return Err(auth::reject_callback(&state, err).await);
        }
    };
    auth::complete_authorization(&state, params).await?;
    Ok(found(DASHBOARD_PATH))
}

/// GET /refresh_token — Mint a new token pair from the stored refresh token.
async fn refresh_token(State(state): State<SharedState>) -> Result<Json<Value>, AppError> {
    session::refresh(&state).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Token refreshed successfully",
    })))
}

/// POST /disconnect — Revoke tokens and forget the session.
async fn disconnect(State(state): State<SharedState>) -> Result<Json<Value>, AppError> {
    let revoked = auth::disconnect(&state).await?;
    Ok(Json(json!({ "success": true, "revoked": revoked })))
}

// =============================================================================
// API
// =============================================================================

/// GET /api/company_info — Relay the connected company's info record.
async fn company_info(State(state): State<SharedState>) -> Result<Json<Value>, AppError> {
    let conn = state
        .session
        .connection()
        .await
        .ok_or_else(|| AppError::NotAuthenticated("Not authenticated with QuickBooks".into()))?;

    let info = state.accounting.get_company_info(&conn).await.map_err(|e| {
        tracing::error!("Company info for realm {} failed: {e}", conn.realm_id());
        e
    })?;

    Ok(Json(info))
}

/// GET /api/session — Connection status without exposing tokens.
async fn session_status(State(state): State<SharedState>) -> Json<Value> {
    let phase = state.session.phase().await;
    let body = match state.session.snapshot().await {
        Some(active) => json!({
            "authenticated": true,
            "phase": phase,
            "realm_id": active.tokens.realm_id,
            "access_token_expires_at": active.access_token_expires_at(),
            "refresh_token_expires_at": active.refresh_token_expires_at(),
        }),
        None => json!({
            "authenticated": false,
            "phase": phase,
            "realm_id": null,
            "access_token_expires_at": null,
            "refresh_token_expires_at": null,
        }),
    };
    Json(body)
}

// =============================================================================
// Health
// =============================================================================

async fn status() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "quickbooks-connect",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
