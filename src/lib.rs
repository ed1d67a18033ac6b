//! Library exports.
//!
//! The work lives in the extracted crates under `crates/`; this facade re-exports them
//! so an OAuth2 server can depend on a single crate:
//! - [`models`]: the token/client types and `StoreError`
//! - [`ports`]: the `TokenStore`/`ClientStore` traits the server consumes
//! - [`storage`]: Postgres stores, adapters and the config-driven factory

pub mod config;
pub mod storage;

pub use oauth2_core as models;
pub use oauth2_observability::init_tracing;
pub use oauth2_ports as ports;
