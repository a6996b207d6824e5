//! Deferred side effects (email delivery, image-service calls, ...).
//!
//! Scheduling returns immediately; the request path never awaits the outcome.
//! Failures are logged and dropped: no retries, nothing surfaced to the caller,
//! so a failed delivery is indistinguishable from a successful one in the response.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    in_flight: AtomicUsize,
    idle: Notify,
}

/// Cloneable handle for scheduling background work.
#[derive(Debug, Clone, Default)]
pub struct DeferredTasks {
    inner: Arc<Inner>,
}

impl DeferredTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` on the runtime and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(&self, name: &'static str, task: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let task_id = Uuid::now_v7();
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.clone();

        tokio::spawn(async move {
            // Inner spawn so a panicking task is still accounted for.
            match tokio::spawn(task).await {
                Ok(Ok(())) => tracing::debug!(task = name, %task_id, "deferred task completed"),
                Ok(Err(e)) => {
                    let error = format!("{e:#}");
                    tracing::warn!(task = name, %task_id, %error, "deferred task failed");
                }
                Err(e) => tracing::warn!(task = name, %task_id, error = %e, "deferred task aborted"),
            }

            if inner.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
                inner.idle.notify_waiters();
            }
        });
    }

    /// Number of scheduled tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Wait until every scheduled task has finished.
    ///
    /// Called during graceful shutdown so work scheduled by the last requests
    /// still runs to completion.
    pub async fn drain(&self) {
        loop {
            let idle = self.inner.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }
}
