//! Postgres-backed OAuth2 token and client stores.
//!
//! Stores talk to the database only through [`Adapter`], so the same store works on
//! top of a single connection ([`ConnAdapter`]) or a pool ([`PoolAdapter`]).
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use oauth2_ports::TokenStore;
//! use oauth2_storage_sqlx::{PgTokenStore, PoolAdapter, TokenStoreOptions};
//!
//! let pool = sqlx::PgPool::connect("postgres://localhost/oauth2").await?;
//! let adapter = Arc::new(PoolAdapter::new(pool));
//! let store = PgTokenStore::new(adapter, TokenStoreOptions::default()).await?;
//! store.close().await?;
//! # Ok(())
//! # }
//! ```

mod adapter;
mod client_store;
mod conn;
mod logger;
mod options;
mod pool;
mod sweeper;
mod token_store;

#[cfg(test)]
mod mock;

pub use adapter::{Adapter, Arg, Record};
pub use client_store::{ClientStoreItem, PgClientStore};
pub use conn::ConnAdapter;
pub use logger::{Logger, MemoryLogger, TracingLogger};
pub use options::{
    ClientStoreOptions, TokenStoreOptions, DEFAULT_CLIENT_TABLE, DEFAULT_GC_INTERVAL,
    DEFAULT_TOKEN_TABLE,
};
pub use pool::PoolAdapter;
pub use token_store::{PgTokenStore, TokenStoreItem};
