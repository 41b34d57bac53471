//! In-memory OAuth session: one token set per process, lost on restart.

pub mod refresh;
pub mod state;

pub use refresh::refresh;
pub use state::{ActiveSession, OAuthSession, SessionPhase, TokenSet};
