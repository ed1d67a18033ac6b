//! Integration ports for OAuth2 persistence.
//!
//! An OAuth2 server talks to these traits only; the Postgres stores in
//! `oauth2-storage-sqlx` (or any other crate) implement them.

pub mod storage;

pub use storage::*;
