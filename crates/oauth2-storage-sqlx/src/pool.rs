use async_trait::async_trait;
use sqlx::PgPool;

use oauth2_core::StoreError;

use crate::adapter::{map_select_error, pg_arguments, Adapter, Arg, Record};

/// Adapter over a connection pool.
///
/// Each statement checks a connection out of the pool for its own duration. The pool
/// handle is a clone of the caller's, so closing the pool stays with the caller.
#[derive(Clone, Debug)]
pub struct PoolAdapter {
    pool: PgPool,
}

impl PoolAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Adapter for PoolAdapter {
    async fn exec(&self, query: &str, args: &[Arg]) -> Result<u64, StoreError> {
        let arguments = pg_arguments(args)?;
        let result = sqlx::query_with(query, arguments)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn select_one<T: Record>(&self, query: &str, args: &[Arg]) -> Result<T, StoreError> {
        let arguments = pg_arguments(args)?;
        sqlx::query_as_with::<_, T, _>(query, arguments)
            .fetch_one(&self.pool)
            .await
            .map_err(map_select_error)
    }
}
