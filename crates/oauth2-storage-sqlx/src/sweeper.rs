use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::adapter::Adapter;
use crate::logger::Logger;

/// Periodic expiry sweep owned by a token store.
///
/// Dropping the handle also ends the loop: the stop receiver resolves once the
/// sender is gone.
pub(crate) struct Sweeper {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Sweeper {
    pub(crate) fn spawn<A: Adapter>(
        adapter: Arc<A>,
        query: String,
        interval: Duration,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let (stop, mut stopped) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {
                        match adapter.exec(&query, &[]).await {
                            Ok(0) => {}
                            Ok(rows) => tracing::debug!(rows, "swept expired tokens"),
                            Err(err) => logger.printf(format_args!(
                                "failed to sweep expired tokens: {err}"
                            )),
                        }
                    }
                }
            }
        });

        Self { stop, task }
    }

    /// Signal the loop and wait for it, so no sweep runs after this returns.
    pub(crate) async fn stop(self) {
        let _ = self.stop.send(());
        if let Err(err) = self.task.await {
            if err.is_panic() {
                tracing::error!(error = %err, "token sweeper panicked");
            }
        }
    }
}
