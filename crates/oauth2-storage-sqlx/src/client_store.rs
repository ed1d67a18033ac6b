use async_trait::async_trait;
use std::sync::Arc;

use oauth2_core::{Client, StoreError};
use oauth2_ports::ClientStore;

use crate::adapter::{Adapter, Arg};
use crate::options::{object_prefix, validate_table_name, ClientStoreOptions};

/// Row shape read back by client lookups.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ClientStoreItem {
    pub id: String,
    pub secret: String,
    pub domain: String,
    pub public: bool,
    pub data: serde_json::Value,
}

impl ClientStoreItem {
    /// The payload carries every client field; the columns win where both exist.
    fn into_client(self) -> Result<Client, StoreError> {
        let mut client: Client = serde_json::from_value(self.data)?;
        client.id = self.id;
        client.secret = self.secret;
        client.domain = self.domain;
        client.public = self.public;
        Ok(client)
    }
}

/// Postgres client registration store.
pub struct PgClientStore<A: Adapter> {
    adapter: Arc<A>,
    table_name: String,
}

impl<A: Adapter> PgClientStore<A> {
    pub async fn new(adapter: Arc<A>, options: ClientStoreOptions) -> Result<Self, StoreError> {
        let ClientStoreOptions {
            table_name,
            init_table_disabled,
        } = options;

        validate_table_name(&table_name)?;

        if !init_table_disabled {
            adapter.exec(&schema_statement(&table_name), &[]).await?;
        }

        Ok(Self {
            adapter,
            table_name,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl<A: Adapter> ClientStore for PgClientStore<A> {
    async fn get_by_id(&self, id: &str) -> Result<Option<Client>, StoreError> {
        // Unlike token lookups, an empty id is "no client" rather than an error:
        // servers probe for clients speculatively.
        if id.is_empty() {
            return Ok(None);
        }

        let query = format!(
            "SELECT id, secret, domain, public, data FROM {} WHERE id = $1",
            self.table_name
        );
        let item: ClientStoreItem = self
            .adapter
            .select_one(&query, &[Arg::Text(id.to_string())])
            .await?;

        item.into_client().map(Some)
    }

    async fn create(&self, client: &Client) -> Result<(), StoreError> {
        let query = format!(
            "INSERT INTO {} (id, secret, domain, public, data) VALUES ($1, $2, $3, $4, $5)",
            self.table_name
        );
        self.adapter
            .exec(&query, &client_args(client)?)
            .await?;

        Ok(())
    }

    async fn update(&self, client: &Client) -> Result<(), StoreError> {
        let query = format!(
            "UPDATE {} SET secret = $2, domain = $3, public = $4, data = $5 WHERE id = $1",
            self.table_name
        );
        self.adapter
            .exec(&query, &client_args(client)?)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if id.is_empty() {
            return Ok(());
        }

        let query = format!("DELETE FROM {} WHERE id = $1", self.table_name);
        self.adapter
            .exec(&query, &[Arg::Text(id.to_string())])
            .await?;

        Ok(())
    }
}

fn client_args(client: &Client) -> Result<Vec<Arg>, StoreError> {
    Ok(vec![
        Arg::Text(client.id.clone()),
        Arg::Text(client.secret.clone()),
        Arg::Text(client.domain.clone()),
        Arg::Bool(client.public),
        Arg::Json(serde_json::to_value(client)?),
    ])
}

fn schema_statement(table_name: &str) -> String {
    let prefix = object_prefix(table_name);
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {table_name} (
    id     TEXT    NOT NULL,
    secret TEXT    NOT NULL,
    domain TEXT    NOT NULL,
    public BOOLEAN NOT NULL DEFAULT FALSE,
    data   JSONB   NOT NULL,
    CONSTRAINT {prefix}_pkey PRIMARY KEY (id)
)"#
    )
}
