use thiserror::Error;

/// Errors surfaced by token and client stores.
///
/// `NoRows` is the stable "nothing matched" signal. Everything else is a driver,
/// payload or construction failure and is never retried by the stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no rows in result set")]
    NoRows,

    /// Driver/transport failure, including constraint violations. Displays
    /// exactly as the driver reported it.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("invalid stored payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("invalid table name: {0:?}")]
    InvalidTableName(String),

    #[error("unsupported storage backend: {0}")]
    UnsupportedBackend(String),
}

impl StoreError {
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows)
    }

    /// True when the database rejected a write because of a unique index.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db_err)) => {
                // Postgres unique violation: 23505
                db_err.code().as_deref() == Some("23505")
                    || db_err.message().contains("duplicate key")
            }
            _ => false,
        }
    }
}
