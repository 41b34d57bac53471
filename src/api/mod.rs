//! HTTP surface for quickbooks-connect.
//!
//! - `/`, `/dashboard`      — static pages (dashboard gated on a connected session)
//! - `/auth/quickbooks`     — start the OAuth flow
//! - `/callback`            — provider redirect target
//! - `/refresh_token`       — refresh the stored tokens
//! - `/disconnect`          — revoke and forget the session
//! - `/api/company_info`    — proxied company info
//! - `/api/session`         — connection status
//! - `/status`              — health check
//!
//! Anything else falls through to files under the public directory.

pub mod routes;

use crate::SharedState;
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    routes::router(state).layer(TraceLayer::new_for_http())
}
