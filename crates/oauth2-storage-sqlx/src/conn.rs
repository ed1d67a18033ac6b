use async_trait::async_trait;
use sqlx::PgConnection;
use tokio::sync::Mutex;

use oauth2_core::StoreError;

use crate::adapter::{map_select_error, pg_arguments, Adapter, Arg, Record};

/// Adapter over one long-lived connection.
///
/// Statements are serialized through an async mutex. The connection is never closed
/// by the stores; take it back with [`ConnAdapter::into_inner`] once they are gone.
pub struct ConnAdapter {
    conn: Mutex<PgConnection>,
}

impl ConnAdapter {
    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn into_inner(self) -> PgConnection {
        self.conn.into_inner()
    }
}

#[async_trait]
impl Adapter for ConnAdapter {
    async fn exec(&self, query: &str, args: &[Arg]) -> Result<u64, StoreError> {
        let arguments = pg_arguments(args)?;
        let mut conn = self.conn.lock().await;
        let result = sqlx::query_with(query, arguments)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn select_one<T: Record>(&self, query: &str, args: &[Arg]) -> Result<T, StoreError> {
        let arguments = pg_arguments(args)?;
        let mut conn = self.conn.lock().await;
        sqlx::query_as_with::<_, T, _>(query, arguments)
            .fetch_one(&mut *conn)
            .await
            .map_err(map_select_error)
    }
}
