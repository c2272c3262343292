use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a request stopped before its operation completed.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Interrupted {
    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation signal and optional deadline carried by every request.
///
/// Contexts are cheap to clone; clones observe the same cancellation signal.
/// Every network round-trip is driven through [`RequestContext::run`], which
/// races the operation against cancellation and the deadline.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Cancels every [`RequestContext`] derived from the same
/// [`RequestContext::cancellable`] call.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context plus the handle that cancels it.
    pub fn cancellable() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            cancel: Some(rx),
            deadline: None,
        };
        (ctx, CancelHandle { tx: Arc::new(tx) })
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().child_with_timeout(timeout)
    }

    /// Derive a context sharing this one's cancellation, expiring no later
    /// than `timeout` from now.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        self.child_with_deadline(Instant::now() + timeout)
    }

    /// Derive a context sharing this one's cancellation, expiring no later
    /// than `deadline`. An earlier parent deadline is kept.
    pub fn child_with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current <= deadline => current,
            _ => deadline,
        };
        Self {
            cancel: self.cancel.clone(),
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Fail fast if the context is already cancelled or expired.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        if self.deadline.is_some_and(|at| Instant::now() >= at) {
            return Err(Interrupted::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drive `fut` to completion unless the context is cancelled or its
    /// deadline passes first. Nothing is polled if the context is already
    /// done.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, Interrupted>
    where
        F: IntoFuture<Output = T>,
    {
        self.check()?;
        let fut = fut.into_future();

        let expiry = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Interrupted::Cancelled),
            _ = expiry => Err(Interrupted::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }

    /// Resolves once the context is cancelled. Never resolves for contexts
    /// without a cancel handle, or whose handle was dropped uncancelled.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.cancel else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        let signalled = rx.wait_for(|cancelled| *cancelled).await.is_ok();
        if !signalled {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_runs_to_completion() {
        let ctx = RequestContext::background();
        assert_eq!(ctx.run(async { 7 }).await, Ok(7));
        assert!(ctx.deadline().is_none());
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn pre_cancelled_context_never_polls() {
        let (ctx, handle) = RequestContext::cancellable();
        handle.cancel();
        let mut polled = false;
        let result = ctx
            .run(async {
                polled = true;
            })
            .await;
        assert_eq!(result, Err(Interrupted::Cancelled));
        assert!(!polled);
    }

    #[tokio::test]
    async fn cancel_interrupts_pending_operation() {
        let (ctx, handle) = RequestContext::cancellable();
        let task = tokio::spawn(async move {
            ctx.run(std::future::pending::<()>()).await
        });
        tokio::task::yield_now().await;
        handle.cancel();
        assert_eq!(task.await.unwrap(), Err(Interrupted::Cancelled));
    }

    #[tokio::test]
    async fn clones_share_cancellation() {
        let (ctx, handle) = RequestContext::cancellable();
        let clone = ctx.clone();
        let child = ctx.child_with_timeout(Duration::from_secs(60));
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(clone.is_cancelled());
        assert_eq!(child.check(), Err(Interrupted::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_interrupts_slow_operation() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(50));
        let result = ctx
            .run(tokio::time::sleep(Duration::from_secs(10)))
            .await;
        assert_eq!(result, Err(Interrupted::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_deadline_fails_check() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(10));
        assert_eq!(ctx.check(), Ok(()));
        tokio::time::advance(Duration::from_millis(20)).await;
        assert_eq!(ctx.check(), Err(Interrupted::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn child_keeps_earlier_parent_deadline() {
        let parent = RequestContext::with_timeout(Duration::from_secs(1));
        let child = parent.child_with_timeout(Duration::from_secs(30));
        assert_eq!(child.deadline(), parent.deadline());

        let tighter = parent.child_with_timeout(Duration::from_millis(100));
        assert!(tighter.deadline() < parent.deadline());
    }

    #[tokio::test]
    async fn dropped_handle_does_not_cancel() {
        let (ctx, handle) = RequestContext::cancellable();
        drop(handle);
        assert_eq!(ctx.run(async { "done" }).await, Ok("done"));
    }
}
