pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod providers;
pub mod quickbooks;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::AppError;

use std::sync::Arc;

use providers::OAuthProvider;
use quickbooks::{AccountingApi, Connection};
use session::{OAuthSession, TokenSet};

/// Shared application state passed to all API handlers.
pub struct AppState {
    pub config: Config,
    pub session: OAuthSession,
    pub provider: Box<dyn OAuthProvider>,
    pub accounting: Box<dyn AccountingApi>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        config: Config,
        provider: Box<dyn OAuthProvider>,
        accounting: Box<dyn AccountingApi>,
    ) -> Self {
        Self {
            config,
            session: OAuthSession::new(),
            provider,
            accounting,
        }
    }

    /// Connection handle for a token set under the configured environment.
    pub fn connect(&self, tokens: &TokenSet) -> Connection {
        quickbooks::build_connection(
            tokens,
            self.config.environment,
            self.config.minor_version.as_deref(),
        )
    }
}
