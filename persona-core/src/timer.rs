//! Cancellable scheduled tasks on the tokio clock

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Handle to a future that runs once a deadline passes
///
/// Dropping the handle detaches the task; only `cancel` stops it. Callbacks
/// must still re-check whatever state they act on when they fire, since a
/// cancel can race a task that has already woken up.
#[derive(Debug)]
pub struct ScheduledTask {
    label: &'static str,
    deadline: Instant,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Run `task` after `delay` from now
    pub fn after<F>(label: &'static str, delay: Duration, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self::at(label, Instant::now() + delay, task)
    }

    /// Run `task` once `deadline` passes
    pub fn at<F>(label: &'static str, deadline: Instant, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            task.await;
        });
        Self {
            label,
            deadline,
            handle,
        }
    }

    /// Stop the task if it has not completed yet; calling it again is a no-op
    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            debug!("Cancelling scheduled task '{}'", self.label);
            self.handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_task_fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let start = Instant::now();
        let task = ScheduledTask::after("blink", Duration::from_millis(100), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(task.label(), "blink");
        assert_eq!(task.deadline(), start + Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_idempotent() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let task = ScheduledTask::after("test", Duration::from_millis(50), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        task.cancel();
        task.cancel();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(task.is_finished());
        task.cancel();
    }
}
