use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::providers::TokenGrant;
use crate::quickbooks::Connection;

/// The single token set held by the process, tagged with the company it
/// grants access to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    #[serde(rename = "x_refresh_token_expires_in")]
    pub refresh_token_expiry_seconds: u64,
    #[serde(rename = "realmId")]
    pub realm_id: String,
}

impl TokenSet {
    pub fn from_grant(grant: TokenGrant, realm_id: String) -> Self {
        TokenSet {
            token_type: grant.token_type,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_in: grant.expires_in,
            refresh_token_expiry_seconds: grant.x_refresh_token_expires_in,
            realm_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Unauthenticated,
    AwaitingCallback,
    Authenticated,
}

/// An authenticated session: tokens, the connection derived from them, and
/// when they were obtained.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub tokens: TokenSet,
    pub connection: Connection,
    pub obtained_at: DateTime<Utc>,
}

impl ActiveSession {
    /// `None` when the provider's lifetime does not fit a calendar instant.
    pub fn access_token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_after(self.tokens.expires_in)
    }

    pub fn refresh_token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_after(self.tokens.refresh_token_expiry_seconds)
    }

    fn expires_after(&self, secs: u64) -> Option<DateTime<Utc>> {
        i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| self.obtained_at.checked_add_signed(d))
    }
}

#[derive(Debug, Default)]
struct Inner {
    awaiting_callback: bool,
    active: Option<ActiveSession>,
}

/// Process-wide OAuth session.
///
/// Holds at most one token set. Writers swap the whole `ActiveSession` under the
/// lock; the lock is never held across a provider call, so two concurrent
/// refreshes race and the last one to finish wins.
#[derive(Debug, Default)]
pub struct OAuthSession {
    inner: RwLock<Inner>,
}

impl OAuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn phase(&self) -> SessionPhase {
        let inner = self.inner.read().await;
        if inner.active.is_some() {
            SessionPhase::Authenticated
        } else if inner.awaiting_callback {
            SessionPhase::AwaitingCallback
        } else {
            SessionPhase::Unauthenticated
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.active.is_some()
    }

    /// Record that the user was sent to the provider.
    pub async fn mark_awaiting_callback(&self) {
        self.inner.write().await.awaiting_callback = true;
    }

    /// Forget a pending authorization after a failed callback. An existing
    /// token set is left in place.
    pub async fn abandon_callback(&self) {
        self.inner.write().await.awaiting_callback = false;
    }

    /// Install a new token set and its connection, replacing any previous one.
    pub async fn establish(&self, tokens: TokenSet, connection: Connection) {
        let mut inner = self.inner.write().await;
        inner.awaiting_callback = false;
        inner.active = Some(ActiveSession {
            tokens,
            connection,
            obtained_at: Utc::now(),
        });
    }

    pub async fn snapshot(&self) -> Option<ActiveSession> {
        self.inner.read().await.active.clone()
    }

    pub async fn tokens(&self) -> Option<TokenSet> {
        self.inner
            .read()
            .await
            .active
            .as_ref()
            .map(|a| a.tokens.clone())
    }

    pub async fn connection(&self) -> Option<Connection> {
        self.inner
            .read()
            .await
            .active
            .as_ref()
            .map(|a| a.connection.clone())
    }

    /// Drop the session, returning what was held.
    pub async fn clear(&self) -> Option<ActiveSession> {
        let mut inner = self.inner.write().await;
        inner.awaiting_callback = false;
        inner.active.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::quickbooks::build_connection;

    fn tokens(access: &str, refresh: &str) -> TokenSet {
        TokenSet {
            token_type: "bearer".into(),
            access_token: access.into(),
            refresh_token: refresh.into(),
            expires_in: 3600,
            refresh_token_expiry_seconds: 8726400,
            realm_id: "999".into(),
        }
    }

    #[test]
    fn token_set_serializes_with_wire_names() {
        let json = serde_json::to_value(tokens("AT1", "RT1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "token_type": "bearer",
                "access_token": "AT1",
                "refresh_token": "RT1",
                "expires_in": 3600,
                "x_refresh_token_expires_in": 8726400,
                "realmId": "999",
            })
        );
    }

    #[tokio::test]
    async fn phase_follows_the_flow() {
        let session = OAuthSession::new();
        assert_eq!(session.phase().await, SessionPhase::Unauthenticated);

        session.mark_awaiting_callback().await;
        assert_eq!(session.phase().await, SessionPhase::AwaitingCallback);

        session.abandon_callback().await;
        assert_eq!(session.phase().await, SessionPhase::Unauthenticated);

        let t = tokens("AT1", "RT1");
        let conn = build_connection(&t, Environment::Sandbox, None);
        session.mark_awaiting_callback().await;
        session.establish(t, conn).await;
        assert_eq!(session.phase().await, SessionPhase::Authenticated);
        assert!(session.is_authenticated().await);
    }

    #[tokio::test]
    async fn establish_replaces_tokens_and_connection() {
        let session = OAuthSession::new();
        let first = tokens("AT1", "RT1");
        session
            .establish(first.clone(), build_connection(&first, Environment::Sandbox, None))
            .await;

        let second = tokens("AT2", "RT2");
        session
            .establish(second.clone(), build_connection(&second, Environment::Sandbox, None))
            .await;

        assert_eq!(session.tokens().await, Some(second));
        assert_eq!(session.connection().await.unwrap().access_token(), "AT2");
    }

    #[tokio::test]
    async fn expiry_instants_derive_from_obtained_at() {
        let session = OAuthSession::new();
        let t = tokens("AT1", "RT1");
        session
            .establish(t.clone(), build_connection(&t, Environment::Sandbox, None))
            .await;

        let active = session.snapshot().await.unwrap();
        assert_eq!(
            active.access_token_expires_at().unwrap() - active.obtained_at,
            Duration::seconds(3600)
        );
        assert_eq!(
            active.refresh_token_expires_at().unwrap() - active.obtained_at,
            Duration::seconds(8726400)
        );
    }

    #[tokio::test]
    async fn oversized_lifetimes_have_no_expiry_instant() {
        let session = OAuthSession::new();
        let mut t = tokens("AT1", "RT1");
        t.expires_in = u64::MAX;
        t.refresh_token_expiry_seconds = u64::MAX / 2;
        session
            .establish(t.clone(), build_connection(&t, Environment::Sandbox, None))
            .await;

        let active = session.snapshot().await.unwrap();
        assert!(active.access_token_expires_at().is_none());
        assert!(active.refresh_token_expires_at().is_none());
    }

    #[tokio::test]
    async fn clear_returns_previous_session() {
        let session = OAuthSession::new();
        assert!(session.clear().await.is_none());

        let t = tokens("AT1", "RT1");
        session
            .establish(t.clone(), build_connection(&t, Environment::Sandbox, None))
            .await;
        let cleared = session.clear().await.unwrap();
        assert_eq!(cleared.tokens, t);
        assert_eq!(session.phase().await, SessionPhase::Unauthenticated);
        assert!(session.connection().await.is_none());
    }
}
