use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Arguments, FromRow};

use oauth2_core::StoreError;

/// A bound statement parameter.
///
/// Stores describe their parameters with this enum so they never depend on a concrete
/// driver type; adapters translate it into the driver's own argument buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Text(String),
    OptText(Option<String>),
    Bool(bool),
    BigInt(i64),
    OptBigInt(Option<i64>),
    OptTimestamp(Option<DateTime<Utc>>),
    Json(serde_json::Value),
}

impl Arg {
    fn encode_into(&self, arguments: &mut PgArguments) -> Result<(), BoxDynError> {
        match self {
            Arg::Text(value) => arguments.add(value.as_str()),
            Arg::OptText(value) => arguments.add(value.as_deref()),
            Arg::Bool(value) => arguments.add(*value),
            Arg::BigInt(value) => arguments.add(*value),
            Arg::OptBigInt(value) => arguments.add(*value),
            Arg::OptTimestamp(value) => arguments.add(*value),
            Arg::Json(value) => arguments.add(value),
        }
    }
}

/// A row type that adapters can decode a single result row into.
pub trait Record: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static {}

impl<T> Record for T where T: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static {}

/// The narrow database capability the stores are written against.
///
/// Implementations must behave identically from a store's point of view: a select
/// that returns zero rows is `StoreError::NoRows`, every other failure is passed
/// through as `StoreError::Database` without wrapping or retrying.
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    /// Execute a statement, returning the number of affected rows.
    async fn exec(&self, query: &str, args: &[Arg]) -> Result<u64, StoreError>;

    /// Execute a query and decode exactly one row.
    async fn select_one<T: Record>(&self, query: &str, args: &[Arg]) -> Result<T, StoreError>;
}

pub(crate) fn pg_arguments(args: &[Arg]) -> Result<PgArguments, StoreError> {
    let mut arguments = PgArguments::default();
    for arg in args {
        arg.encode_into(&mut arguments)
            .map_err(sqlx::Error::Encode)?;
    }
    Ok(arguments)
}

pub(crate) fn map_select_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NoRows,
        other => StoreError::Database(other),
    }
}
