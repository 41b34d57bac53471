use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which Intuit environment the app is registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    /// Base URL of the accounting API for this environment.
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://sandbox-quickbooks.api.intuit.com",
            Environment::Production => "https://quickbooks.api.intuit.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "production" => Ok(Environment::Production),
            other => bail!("QB_ENVIRONMENT must be 'sandbox' or 'production', got '{other}'"),
        }
    }
}

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ── Server ──────────────────────────────────────────────────────────
    pub host: String,
    pub port: u16,
    /// Directory holding index.html, dashboard.html and other static assets.
    pub public_dir: PathBuf,

    // ── Intuit OAuth ────────────────────────────────────────────────────
    pub client_id: String,
    pub client_secret: String,
    pub environment: Environment,
    pub redirect_uri: String,
    /// Anti-forgery token sent with the authorization request and expected back.
    pub oauth_state: String,

    // ── Accounting API ──────────────────────────────────────────────────
    pub minor_version: Option<String>,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            var(key)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{key} is required"))
        };

        Ok(Config {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: var("PORT")
                .unwrap_or_else(|| "3000".into())
                .parse()
                .context("Invalid PORT")?,
            public_dir: var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),

            client_id: required("QB_CLIENT_ID")?,
            client_secret: required("QB_CLIENT_SECRET")?,
            environment: var("QB_ENVIRONMENT")
                .unwrap_or_else(|| "sandbox".into())
                .parse()?,
            redirect_uri: required("QB_REDIRECT_URI")?,
            oauth_state: var("QB_OAUTH_STATE").unwrap_or_else(|| "teststate".into()),

            minor_version: var("QB_MINOR_VERSION").filter(|v| !v.is_empty()),
            http_timeout: Duration::from_secs(
                var("HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|| "30".into())
                    .parse()
                    .context("Invalid HTTP_TIMEOUT_SECS")?,
            ),
        })
    }

    /// Local URL printed at startup.
    pub fn local_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}
