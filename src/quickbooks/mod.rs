//! QuickBooks Online accounting API access.
//!
//! A [`Connection`] is a disposable handle derived from the session's token
//! set; [`AccountingApi`] issues calls through it.

pub mod client;
pub mod connection;

pub use client::{AccountingApi, QuickBooksClient};
pub use connection::{build_connection, Connection};
