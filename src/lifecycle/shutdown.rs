//! Shutdown coordination for background tasks.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Coordinator for graceful shutdown.
///
/// Long-running tasks subscribe to a broadcast signal and are spawned through
/// the coordinator so that shutdown can wait for them to drain.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    tasks: Mutex<Vec<(String, JoinHandle<()>)>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Spawn a tracked task. The future should stop on its own subscription.
    pub fn spawn<F>(&self, name: &str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), handle));
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Wait up to `timeout` for every tracked task; stragglers are aborted.
    /// Returns the number of tasks that finished in time.
    pub async fn wait(&self, timeout: Duration) -> usize {
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        let deadline = Instant::now() + timeout;
        let mut finished = 0;

        for (name, handle) in tasks {
            let abort = handle.abort_handle();
            match time::timeout_at(deadline, handle).await {
                Ok(Ok(())) => finished += 1,
                Ok(Err(e)) => tracing::error!(task = %name, error = %e, "Task ended abnormally"),
                Err(_) => {
                    tracing::warn!(task = %name, "Task did not stop before deadline, aborting");
                    abort.abort();
                }
            }
        }
        finished
    }

    /// Number of receivers still listening for the signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tasks_drain_on_trigger() {
        let shutdown = Shutdown::new();
        for name in ["a", "b"] {
            let mut rx = shutdown.subscribe();
            shutdown.spawn(name, async move {
                let _ = rx.recv().await;
            });
        }
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger();
        assert_eq!(shutdown.wait(Duration::from_secs(1)).await, 2);
    }

    #[tokio::test]
    async fn test_stuck_task_is_aborted() {
        let shutdown = Shutdown::new();
        shutdown.spawn("stuck", async {
            time::sleep(Duration::from_secs(60)).await;
        });

        shutdown.trigger();
        assert_eq!(shutdown.wait(Duration::from_millis(20)).await, 0);
    }
}
