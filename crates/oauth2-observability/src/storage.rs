use async_trait::async_trait;
use tracing::Instrument;

use oauth2_core::{Client, StoreError, Token};
use oauth2_ports::{ClientStore, DynClientStore, DynTokenStore, TokenStore};

/// At most 12 characters and never more than half the key.
fn key_prefix(key: &str) -> String {
    let visible = (key.chars().count() / 2).min(12);
    key.chars().take(visible).collect::<String>()
}

/// A thin wrapper around a `DynTokenStore` that creates a tracing span for each call.
///
/// Token values are secrets: spans carry a short prefix and the length, never the key.
pub struct ObservedTokenStore {
    inner: DynTokenStore,
    db_system: String,
}

impl ObservedTokenStore {
    pub fn new(inner: DynTokenStore, db_system: String) -> Self {
        Self { inner, db_system }
    }

    fn key_span(&self, operation: &'static str, key: &str) -> tracing::Span {
        tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = operation,
            key_prefix = %key_prefix(key),
            key_len = key.len()
        )
    }
}

#[async_trait]
impl TokenStore for ObservedTokenStore {
    async fn create(&self, token: &Token) -> Result<(), StoreError> {
        let span = tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = "create_token",
            client_id = %token.client_id,
            user_id = %token.user_id,
            has_code = !token.code.is_empty(),
            has_access = !token.access.is_empty(),
            has_refresh = !token.refresh.is_empty()
        );
        async move { self.inner.create(token).await }
            .instrument(span)
            .await
    }

    async fn get_by_code(&self, code: &str) -> Result<Token, StoreError> {
        let span = self.key_span("get_token_by_code", code);
        async move { self.inner.get_by_code(code).await }
            .instrument(span)
            .await
    }

    async fn get_by_access(&self, access: &str) -> Result<Token, StoreError> {
        let span = self.key_span("get_token_by_access", access);
        async move { self.inner.get_by_access(access).await }
            .instrument(span)
            .await
    }

    async fn get_by_refresh(&self, refresh: &str) -> Result<Token, StoreError> {
        let span = self.key_span("get_token_by_refresh", refresh);
        async move { self.inner.get_by_refresh(refresh).await }
            .instrument(span)
            .await
    }

    async fn remove_by_code(&self, code: &str) -> Result<(), StoreError> {
        let span = self.key_span("remove_token_by_code", code);
        async move { self.inner.remove_by_code(code).await }
            .instrument(span)
            .await
    }

    async fn remove_by_access(&self, access: &str) -> Result<(), StoreError> {
        let span = self.key_span("remove_token_by_access", access);
        async move { self.inner.remove_by_access(access).await }
            .instrument(span)
            .await
    }

    async fn remove_by_refresh(&self, refresh: &str) -> Result<(), StoreError> {
        let span = self.key_span("remove_token_by_refresh", refresh);
        async move { self.inner.remove_by_refresh(refresh).await }
            .instrument(span)
            .await
    }

    async fn close(&self) -> Result<(), StoreError> {
        let span = tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = "close_token_store"
        );
        async move { self.inner.close().await }
            .instrument(span)
            .await
    }
}

/// Span-per-call wrapper around a `DynClientStore`.
pub struct ObservedClientStore {
    inner: DynClientStore,
    db_system: String,
}

impl ObservedClientStore {
    pub fn new(inner: DynClientStore, db_system: String) -> Self {
        Self { inner, db_system }
    }

    fn span(&self, operation: &'static str, client_id: &str) -> tracing::Span {
        tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = operation,
            client_id = %client_id
        )
    }
}

#[async_trait]
impl ClientStore for ObservedClientStore {
    async fn get_by_id(&self, id: &str) -> Result<Option<Client>, StoreError> {
        let span = self.span("get_client", id);
        async move { self.inner.get_by_id(id).await }
            .instrument(span)
            .await
    }

    async fn create(&self, client: &Client) -> Result<(), StoreError> {
        let span = self.span("create_client", &client.id);
        async move { self.inner.create(client).await }
            .instrument(span)
            .await
    }

    async fn update(&self, client: &Client) -> Result<(), StoreError> {
        let span = self.span("update_client", &client.id);
        async move { self.inner.update(client).await }
            .instrument(span)
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let span = self.span("delete_client", id);
        async move { self.inner.delete(id).await }
            .instrument(span)
            .await
    }
}
