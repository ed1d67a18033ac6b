use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the process-wide subscriber: JSON lines filtered by `RUST_LOG` (default `info`).
///
/// `try_init` also installs the `log` bridge, so driver-level logging from sqlx ends up
/// in the same stream. Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()?;

    Ok(())
}
