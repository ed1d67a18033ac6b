//! Framework-agnostic OAuth2 model types.
//!
//! These are the objects an OAuth2 server hands to its token and client stores.
//! Storage crates persist them; they never interpret the grant flows themselves.

pub mod models;

pub use models::*;
