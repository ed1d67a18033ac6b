use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use oauth2_core::{StoreError, Token};
use oauth2_ports::TokenStore;

use crate::adapter::{Adapter, Arg};
use crate::options::{object_prefix, validate_table_name, TokenStoreOptions};
use crate::sweeper::Sweeper;

/// Row shape read back by token lookups.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TokenStoreItem {
    pub data: serde_json::Value,
}

/// The three unique, nullable key columns a token row can be found by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyColumn {
    Code,
    Access,
    Refresh,
}

impl KeyColumn {
    const ALL: [KeyColumn; 3] = [KeyColumn::Code, KeyColumn::Access, KeyColumn::Refresh];

    fn as_str(self) -> &'static str {
        match self {
            KeyColumn::Code => "code",
            KeyColumn::Access => "access",
            KeyColumn::Refresh => "refresh",
        }
    }
}

/// Latest expiry instant persisted, 9999-12-31T23:59:59Z in Unix milliseconds.
///
/// Keeps `create_at + expires_in * INTERVAL '1 millisecond'` inside both the interval
/// and the timestamp range of Postgres, so one "never expires" token cannot make
/// every sweep fail.
const MAX_EXPIRES_AT_MILLIS: i64 = 253_402_300_799_000;

/// One populated {key, created at, lifetime} triple of a token.
struct GrantWindow<'a> {
    key: &'a str,
    create_at: DateTime<Utc>,
    expires_in: Duration,
}

impl<'a> GrantWindow<'a> {
    fn of(
        key: &'a str,
        create_at: Option<DateTime<Utc>>,
        expires_in: Duration,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        if key.is_empty() {
            return None;
        }
        Some(Self {
            key,
            create_at: create_at.unwrap_or(now),
            expires_in,
        })
    }

    /// Stored lifetime, clamped so the row expires no later than `MAX_EXPIRES_AT_MILLIS`.
    fn expires_in_millis(&self) -> i64 {
        let requested = i64::try_from(self.expires_in.as_millis()).unwrap_or(i64::MAX);
        let headroom = MAX_EXPIRES_AT_MILLIS
            .saturating_sub(self.create_at.timestamp_millis())
            .max(0);
        requested.min(headroom)
    }
}

fn push_window(args: &mut Vec<Arg>, window: Option<GrantWindow<'_>>) {
    args.push(Arg::OptText(window.as_ref().map(|w| w.key.to_string())));
    args.push(Arg::OptTimestamp(window.as_ref().map(|w| w.create_at)));
    args.push(Arg::OptBigInt(window.as_ref().map(GrantWindow::expires_in_millis)));
}

/// Postgres token store.
///
/// Code, access and refresh grants share one table; a row is found by whichever of
/// the three unique key columns is populated. A background sweeper deletes rows once
/// every populated window has elapsed.
pub struct PgTokenStore<A: Adapter> {
    adapter: Arc<A>,
    table_name: String,
    sweeper: Mutex<Option<Sweeper>>,
}

impl<A: Adapter> PgTokenStore<A> {
    /// Build the store, creating the table unless disabled, then start the sweeper.
    pub async fn new(adapter: Arc<A>, options: TokenStoreOptions) -> Result<Self, StoreError> {
        let TokenStoreOptions {
            table_name,
            logger,
            gc_interval,
            init_table_disabled,
        } = options;

        validate_table_name(&table_name)?;

        if !init_table_disabled {
            for statement in schema_statements(&table_name) {
                adapter.exec(&statement, &[]).await?;
            }
        }

        let sweeper = if gc_interval.is_zero() {
            None
        } else {
            Some(Sweeper::spawn(
                Arc::clone(&adapter),
                sweep_query(&table_name),
                gc_interval,
                logger,
            ))
        };

        Ok(Self {
            adapter,
            table_name,
            sweeper: Mutex::new(sweeper),
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn get_by(&self, column: KeyColumn, key: &str) -> Result<Token, StoreError> {
        // An empty key must never reach the database: it would be compared against
        // NULL columns.
        if key.is_empty() {
            return Err(StoreError::NoRows);
        }

        let query = format!(
            "SELECT data FROM {} WHERE {} = $1",
            self.table_name,
            column.as_str()
        );
        let item: TokenStoreItem = self
            .adapter
            .select_one(&query, &[Arg::Text(key.to_string())])
            .await?;

        Ok(serde_json::from_value(item.data)?)
    }

    async fn remove_by(&self, column: KeyColumn, key: &str) -> Result<(), StoreError> {
        if key.is_empty() {
            return Ok(());
        }

        let query = format!(
            "DELETE FROM {} WHERE {} = $1",
            self.table_name,
            column.as_str()
        );
        self.adapter
            .exec(&query, &[Arg::Text(key.to_string())])
            .await?;

        Ok(())
    }
}

#[async_trait]
impl<A: Adapter> TokenStore for PgTokenStore<A> {
    async fn create(&self, token: &Token) -> Result<(), StoreError> {
        let data = serde_json::to_value(token)?;
        let now = Utc::now();

        let mut args = vec![
            Arg::Text(token.client_id.clone()),
            Arg::Text(token.user_id.clone()),
            Arg::Text(token.redirect_uri.clone()),
            Arg::Text(token.scope.clone()),
        ];
        push_window(
            &mut args,
            GrantWindow::of(&token.code, token.code_create_at, token.code_expires_in, now),
        );
        push_window(
            &mut args,
            GrantWindow::of(
                &token.access,
                token.access_create_at,
                token.access_expires_in,
                now,
            ),
        );
        push_window(
            &mut args,
            GrantWindow::of(
                &token.refresh,
                token.refresh_create_at,
                token.refresh_expires_in,
                now,
            ),
        );
        args.push(Arg::Json(data));

        let query = format!(
            r#"INSERT INTO {} (
                client_id, user_id, redirect_uri, scope,
                code, code_create_at, code_expires_in,
                access, access_create_at, access_expires_in,
                refresh, refresh_create_at, refresh_expires_in,
                data
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
            self.table_name
        );
        self.adapter.exec(&query, &args).await?;

        Ok(())
    }

    async fn get_by_code(&self, code: &str) -> Result<Token, StoreError> {
        self.get_by(KeyColumn::Code, code).await
    }

    async fn get_by_access(&self, access: &str) -> Result<Token, StoreError> {
        self.get_by(KeyColumn::Access, access).await
    }

    async fn get_by_refresh(&self, refresh: &str) -> Result<Token, StoreError> {
        self.get_by(KeyColumn::Refresh, refresh).await
    }

    async fn remove_by_code(&self, code: &str) -> Result<(), StoreError> {
        self.remove_by(KeyColumn::Code, code).await
    }

    async fn remove_by_access(&self, access: &str) -> Result<(), StoreError> {
        self.remove_by(KeyColumn::Access, access).await
    }

    async fn remove_by_refresh(&self, refresh: &str) -> Result<(), StoreError> {
        self.remove_by(KeyColumn::Refresh, refresh).await
    }

    async fn close(&self) -> Result<(), StoreError> {
        let sweeper = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(sweeper) = sweeper {
            sweeper.stop().await;
        }

        Ok(())
    }
}

fn schema_statements(table_name: &str) -> Vec<String> {
    let prefix = object_prefix(table_name);

    let mut statements = vec![format!(
        r#"
CREATE TABLE IF NOT EXISTS {table_name} (
    id                 BIGSERIAL   NOT NULL,
    client_id          TEXT        NOT NULL,
    user_id            TEXT        NOT NULL,
    redirect_uri       TEXT        NOT NULL,
    scope              TEXT        NOT NULL,
    code               TEXT,
    code_create_at     TIMESTAMPTZ,
    code_expires_in    BIGINT,
    access             TEXT,
    access_create_at   TIMESTAMPTZ,
    access_expires_in  BIGINT,
    refresh            TEXT,
    refresh_create_at  TIMESTAMPTZ,
    refresh_expires_in BIGINT,
    data               JSONB       NOT NULL,
    CONSTRAINT {prefix}_pkey PRIMARY KEY (id)
)"#
    )];

    // Unique indexes admit any number of NULLs, so rows without a given key coexist.
    for column in KeyColumn::ALL {
        let column = column.as_str();
        statements.push(format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_{prefix}_{column} ON {table_name} ({column})"
        ));
    }

    statements
}

/// A row is expired once every populated window has elapsed; absent keys never keep
/// it alive.
fn sweep_query(table_name: &str) -> String {
    let conditions = KeyColumn::ALL
        .iter()
        .map(|column| {
            let column = column.as_str();
            format!(
                "({column} IS NULL OR {column}_create_at + {column}_expires_in * INTERVAL '1 millisecond' <= NOW())"
            )
        })
        .collect::<Vec<_>>()
        .join(" AND ");

    format!("DELETE FROM {table_name} WHERE {conditions}")
}
