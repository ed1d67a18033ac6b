use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Sink for non-fatal internal errors, such as a failed expiry sweep.
///
/// Never used on the request path: caller-facing failures are returned, not logged.
pub trait Logger: Send + Sync {
    fn printf(&self, args: fmt::Arguments<'_>);
}

/// Forwards entries to `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn printf(&self, args: fmt::Arguments<'_>) {
        tracing::error!(target: "oauth2_storage_sqlx", "{}", args);
    }
}

/// Keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Logger for MemoryLogger {
    fn printf(&self, args: fmt::Arguments<'_>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(args.to_string());
    }
}
