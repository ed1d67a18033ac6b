pub mod storage;
pub mod telemetry;

pub use storage::{ObservedClientStore, ObservedTokenStore};
pub use telemetry::init_tracing;
