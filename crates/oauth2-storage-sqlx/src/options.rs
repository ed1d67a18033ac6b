use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use oauth2_core::StoreError;

use crate::logger::{Logger, TracingLogger};

pub const DEFAULT_TOKEN_TABLE: &str = "oauth2_tokens";
pub const DEFAULT_CLIENT_TABLE: &str = "oauth2_clients";
pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Construction-time settings for [`crate::PgTokenStore`].
#[derive(Clone)]
pub struct TokenStoreOptions {
    pub(crate) table_name: String,
    pub(crate) logger: Arc<dyn Logger>,
    pub(crate) gc_interval: Duration,
    pub(crate) init_table_disabled: bool,
}

impl Default for TokenStoreOptions {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TOKEN_TABLE.to_string(),
            logger: Arc::new(TracingLogger),
            gc_interval: DEFAULT_GC_INTERVAL,
            init_table_disabled: false,
        }
    }
}

impl TokenStoreOptions {
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Period of the expiry sweep. `Duration::ZERO` disables sweeping.
    pub fn with_gc_interval(mut self, gc_interval: Duration) -> Self {
        self.gc_interval = gc_interval;
        self
    }

    /// Skip `CREATE TABLE`/`CREATE INDEX` at construction (schema managed elsewhere).
    pub fn with_init_table_disabled(mut self, disabled: bool) -> Self {
        self.init_table_disabled = disabled;
        self
    }
}

impl fmt::Debug for TokenStoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStoreOptions")
            .field("table_name", &self.table_name)
            .field("gc_interval", &self.gc_interval)
            .field("init_table_disabled", &self.init_table_disabled)
            .finish_non_exhaustive()
    }
}

/// Construction-time settings for [`crate::PgClientStore`].
#[derive(Debug, Clone)]
pub struct ClientStoreOptions {
    pub(crate) table_name: String,
    pub(crate) init_table_disabled: bool,
}

impl Default for ClientStoreOptions {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_CLIENT_TABLE.to_string(),
            init_table_disabled: false,
        }
    }
}

impl ClientStoreOptions {
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_init_table_disabled(mut self, disabled: bool) -> Self {
        self.init_table_disabled = disabled;
        self
    }
}

/// Table names are spliced into SQL text, so only plain identifiers are accepted:
/// `[A-Za-z_][A-Za-z0-9_]*`, optionally qualified by one schema.
pub(crate) fn validate_table_name(name: &str) -> Result<(), StoreError> {
    let mut parts = name.split('.');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(table), None, None) => is_identifier(table),
        (Some(schema), Some(table), None) => is_identifier(schema) && is_identifier(table),
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidTableName(name.to_string()))
    }
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Index and constraint names cannot carry the schema qualifier.
pub(crate) fn object_prefix(table_name: &str) -> String {
    table_name.replace('.', "_")
}
