//! In-process fakes for the provider and the accounting API.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{Config, Environment};
use crate::error::AppError;
use crate::providers::{OAuthProvider, TokenGrant};
use crate::quickbooks::{AccountingApi, Connection};
use crate::session::TokenSet;
use crate::AppState;

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 3000,
        public_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public"),
        client_id: "client-123".into(),
        client_secret: "s3cret".into(),
        environment: Environment::Sandbox,
        redirect_uri: "http://localhost:3000/callback".into(),
        oauth_state: "teststate".into(),
        minor_version: None,
        http_timeout: Duration::from_secs(5),
    }
}

pub fn grant(access: &str, refresh: &str) -> TokenGrant {
    TokenGrant {
        token_type: "bearer".into(),
        access_token: access.into(),
        refresh_token: refresh.into(),
        expires_in: 3600,
        x_refresh_token_expires_in: 8726400,
    }
}

pub fn token_set(access: &str, refresh: &str, realm: &str) -> TokenSet {
    TokenSet::from_grant(grant(access, refresh), realm.into())
}

/// Scripted provider: returns the configured outcome on every call and records
/// the arguments it was given.
#[derive(Clone, Default)]
pub struct FakeProvider {
    pub exchange_result: Arc<Mutex<Option<Result<TokenGrant, String>>>>,
    pub refresh_result: Arc<Mutex<Option<Result<TokenGrant, String>>>>,
    pub revoke_fails: Arc<Mutex<bool>>,
    pub exchanged_codes: Arc<Mutex<Vec<String>>>,
    pub refreshed_with: Arc<Mutex<Vec<String>>>,
    pub revoked: Arc<Mutex<Vec<String>>>,
}

impl FakeProvider {
    pub fn exchanging(grant: TokenGrant) -> Self {
        let fake = Self::default();
        *fake.exchange_result.lock().unwrap() = Some(Ok(grant));
        fake
    }

    pub fn refreshing(self, result: Result<TokenGrant, String>) -> Self {
        *self.refresh_result.lock().unwrap() = Some(result);
        self
    }

    pub fn failing_exchange(msg: &str) -> Self {
        let fake = Self::default();
        *fake.exchange_result.lock().unwrap() = Some(Err(msg.into()));
        fake
    }
}

#[async_trait]
impl OAuthProvider for FakeProvider {
    fn id(&self) -> &str {
        "fake"
    }

    fn auth_url(&self, scopes: &[&str], state: &str, redirect_uri: &str) -> String {
        format!(
            "https://provider.test/authorize?scope={}&state={state}&redirect_uri={redirect_uri}",
            scopes.join("+")
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        _redirect_uri: &str,
    ) -> Result<TokenGrant, AppError> {
        self.exchanged_codes.lock().unwrap().push(code.into());
        match self.exchange_result.lock().unwrap().clone() {
            Some(Ok(grant)) => Ok(grant),
            Some(Err(msg)) => Err(AppError::Authentication(msg)),
            None => Err(AppError::Authentication("no exchange scripted".into())),
        }
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, AppError> {
        self.refreshed_with.lock().unwrap().push(refresh_token.into());
        match self.refresh_result.lock().unwrap().clone() {
            Some(Ok(grant)) => Ok(grant),
            Some(Err(msg)) => Err(AppError::Refresh(msg)),
            None => Err(AppError::Refresh("no refresh scripted".into())),
        }
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        self.revoked.lock().unwrap().push(token.into());
        if *self.revoke_fails.lock().unwrap() {
            return Err(AppError::Revoke("400 Bad Request: invalid_token".into()));
        }
        Ok(())
    }
}

/// Accounting API fake that counts calls and remembers the realm it was asked for.
#[derive(Clone)]
pub struct FakeAccounting {
    pub calls: Arc<AtomicUsize>,
    pub realms: Arc<Mutex<Vec<String>>>,
    pub result: Result<Value, String>,
}

impl FakeAccounting {
    pub fn ok() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            realms: Arc::new(Mutex::new(Vec::new())),
            result: Ok(json!({
                "CompanyInfo": { "CompanyName": "Sandbox Company_US_1", "Id": "1" },
                "time": "2024-01-01T00:00:00.000-08:00"
            })),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            result: Err(msg.into()),
            ..Self::ok()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountingApi for FakeAccounting {
    async fn get_company_info(&self, conn: &Connection) -> Result<Value, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.realms.lock().unwrap().push(conn.realm_id().into());
        self.result.clone().map_err(AppError::Downstream)
    }
}

pub fn test_state(provider: FakeProvider, accounting: FakeAccounting) -> Arc<AppState> {
    Arc::new(AppState::new(
        test_config(),
        Box::new(provider),
        Box::new(accounting),
    ))
}

/// State that already holds tokens for realm 999.
pub async fn authenticated_state(
    provider: FakeProvider,
    accounting: FakeAccounting,
) -> Arc<AppState> {
    let state = test_state(provider, accounting);
    let tokens = token_set("AT1", "RT1", "999");
    let conn = state.connect(&tokens);
    state.session.establish(tokens, conn).await;
    state
}
