//! Store assembly for the OAuth2 server.
//!
//! This crate turns a `StorageConfig` into ready-to-use token and client stores: it
//! picks the adapter (pool vs. single connection), builds both Postgres stores on it
//! and wraps them with the observed stores for tracing.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection};

use oauth2_config::StorageConfig;
use oauth2_core::StoreError;
use oauth2_storage_sqlx::{
    Adapter, ClientStoreOptions, ConnAdapter, PgClientStore, PgTokenStore, PoolAdapter,
    TokenStoreOptions,
};

pub use oauth2_observability::{ObservedClientStore, ObservedTokenStore};
pub use oauth2_ports::{ClientStore, DynClientStore, DynTokenStore, TokenStore};

const DB_SYSTEM: &str = "postgresql";

/// Both stores, sharing one adapter.
#[derive(Clone)]
pub struct Storage {
    pub tokens: DynTokenStore,
    pub clients: DynClientStore,
}

impl Storage {
    /// Stop the token sweeper. The adapter's connection(s) close once the stores drop.
    pub async fn close(&self) -> Result<(), StoreError> {
        self.tokens.close().await
    }
}

/// Create both stores based on configuration.
///
/// Supported: `postgres://...` and `postgresql://...`.
pub async fn create_storage(config: &StorageConfig) -> Result<Storage, StoreError> {
    let url = config.database_url.as_str();
    if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
        let scheme = url.split(':').next().unwrap_or_default();
        return Err(StoreError::UnsupportedBackend(format!(
            "`{scheme}` URLs are not supported; expected postgres:// or postgresql://"
        )));
    }

    tracing::info!(
        database_url = %config.sanitized().database_url,
        pooled = config.pooled,
        "connecting token/client storage"
    );

    if config.pooled {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;
        build(Arc::new(PoolAdapter::new(pool)), config).await
    } else {
        let conn = PgConnection::connect(url).await?;
        build(Arc::new(ConnAdapter::new(conn)), config).await
    }
}

async fn build<A: Adapter>(adapter: Arc<A>, config: &StorageConfig) -> Result<Storage, StoreError> {
    let clients = PgClientStore::new(
        Arc::clone(&adapter),
        ClientStoreOptions::default()
            .with_table_name(config.client_table.clone())
            .with_init_table_disabled(config.init_table_disabled),
    )
    .await?;

    // Built last: nothing fallible follows the sweeper's start.
    let tokens = PgTokenStore::new(
        adapter,
        TokenStoreOptions::default()
            .with_table_name(config.token_table.clone())
            .with_gc_interval(config.gc_interval())
            .with_init_table_disabled(config.init_table_disabled),
    )
    .await?;

    let tokens: DynTokenStore = Arc::new(ObservedTokenStore::new(
        Arc::new(tokens),
        DB_SYSTEM.to_string(),
    ));
    let clients: DynClientStore = Arc::new(ObservedClientStore::new(
        Arc::new(clients),
        DB_SYSTEM.to_string(),
    ));

    Ok(Storage { tokens, clients })
}
