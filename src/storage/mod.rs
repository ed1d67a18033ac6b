pub use oauth2_storage_factory::{create_storage, Storage};

/// Postgres stores and the database adapters they run on.
pub use oauth2_storage_sqlx as sqlx;

pub use oauth2_observability::{ObservedClientStore, ObservedTokenStore};
