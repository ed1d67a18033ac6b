pub use oauth2_config::{Config, StorageConfig};
