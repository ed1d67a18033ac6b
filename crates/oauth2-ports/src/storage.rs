use async_trait::async_trait;
use std::sync::Arc;

use oauth2_core::{Client, StoreError, Token};

/// Persistence for issued grants (authorization codes, access and refresh tokens).
///
/// Lookups return `StoreError::NoRows` when nothing matches, including for an
/// empty key. Removals are idempotent.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn create(&self, token: &Token) -> Result<(), StoreError>;

    async fn get_by_code(&self, code: &str) -> Result<Token, StoreError>;
    async fn get_by_access(&self, access: &str) -> Result<Token, StoreError>;
    async fn get_by_refresh(&self, refresh: &str) -> Result<Token, StoreError>;

    async fn remove_by_code(&self, code: &str) -> Result<(), StoreError>;
    async fn remove_by_access(&self, access: &str) -> Result<(), StoreError>;
    async fn remove_by_refresh(&self, refresh: &str) -> Result<(), StoreError>;

    /// Stop background work owned by the store.
    ///
    /// Does not close the underlying database connection. Calling it again is a no-op.
    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Persistence for registered clients.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// `Ok(None)` for an empty id, without touching the database.
    ///
    /// A non-empty id that matches nothing is `StoreError::NoRows`.
    async fn get_by_id(&self, id: &str) -> Result<Option<Client>, StoreError>;

    async fn create(&self, client: &Client) -> Result<(), StoreError>;
    async fn update(&self, client: &Client) -> Result<(), StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

pub type DynTokenStore = Arc<dyn TokenStore>;
pub type DynClientStore = Arc<dyn ClientStore>;
