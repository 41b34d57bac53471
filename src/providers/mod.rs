mod intuit;
mod traits;

pub use intuit::{IntuitProvider, SCOPE_ACCOUNTING};
pub use traits::{OAuthProvider, TokenGrant};

use crate::config::Config;
use crate::error::AppError;

/// Build the provider for the configured Intuit app.
pub fn from_config(config: &Config) -> Result<IntuitProvider, AppError> {
    IntuitProvider::new(
        config.client_id.clone(),
        config.client_secret.clone(),
        config.http_timeout,
    )
}
