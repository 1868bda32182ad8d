//! Worker pool that client calls are dispatched onto.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::ClientError;

/// A pool of reusable workers.
///
/// Either owns a multi-thread tokio runtime or borrows an existing one
/// through its [`Handle`]. Dropping an owning pool lets every dispatched
/// call finish first: the runtime moves to a background thread that shuts
/// it down once the last call completes. Only [`shutdown`] interrupts calls.
/// Neither blocks, so the pool may be dropped from async code.
///
/// [`shutdown`]: WorkerPool::shutdown
#[derive(Debug)]
pub struct WorkerPool {
    handle: Handle,
    runtime: Option<Runtime>,
    in_flight: Arc<InFlight>,
}

/// Count of dispatched calls that have not finished yet.
#[derive(Debug, Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.count.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Decrements the in-flight count however the task ends.
struct CallGuard(Arc<InFlight>);

impl Drop for CallGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

impl WorkerPool {
    /// Start an owned pool. `None` uses tokio's default thread count.
    pub fn new(worker_threads: Option<usize>) -> Result<Self, ClientError> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all().thread_name("openai-gen-worker");
        if let Some(threads) = worker_threads {
            builder.worker_threads(threads);
        }
        let runtime = builder.build().map_err(ClientError::Runtime)?;
        debug!(?worker_threads, "started worker pool");

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
            in_flight: Arc::default(),
        })
    }

    /// Dispatch onto an existing runtime. Its lifecycle stays with the caller.
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            handle,
            runtime: None,
            in_flight: Arc::default(),
        }
    }

    /// Dispatch onto the runtime the caller is running in.
    pub fn current() -> Result<Self, ClientError> {
        Handle::try_current()
            .map(Self::from_handle)
            .map_err(|e| ClientError::Config(e.to_string()))
    }

    pub fn is_owned(&self) -> bool {
        self.runtime.is_some()
    }

    /// Number of dispatched calls still running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.count.load(Ordering::Acquire)
    }

    /// Run `task` on the pool. `interrupted` is what the returned future
    /// resolves to if the pool is shut down before the task finishes.
    pub fn spawn<F>(&self, task: F, interrupted: F::Output) -> Pending<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.in_flight.count.fetch_add(1, Ordering::AcqRel);
        let guard = CallGuard(Arc::clone(&self.in_flight));

        Pending {
            task: self.handle.spawn(async move {
                let _guard = guard;
                task.await
            }),
            interrupted: Some(interrupted),
        }
    }

    /// Stop an owned pool without waiting for in-flight calls; their
    /// [`Pending`] futures resolve to the interrupted value.
    pub fn shutdown(mut self) {
        if let Some(runtime) = self.runtime.take() {
            debug!(in_flight = self.in_flight(), "shutting down worker pool");
            runtime.shutdown_background();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        let Some(runtime) = self.runtime.take().map(|r| Detached(Some(r))) else {
            return;
        };
        if self.in_flight() == 0 {
            return;
        }

        debug!(in_flight = self.in_flight(), "draining worker pool");
        let in_flight = Arc::clone(&self.in_flight);
        let drained = std::thread::Builder::new()
            .name("openai-gen-drain".to_string())
            .spawn(move || {
                if let Some(runtime) = &runtime.0 {
                    runtime.block_on(in_flight.wait_idle());
                }
            });
        if let Err(e) = drained {
            warn!(error = %e, "could not drain worker pool, in-flight calls are interrupted");
        }
    }
}

/// Runtime that shuts down in the background when dropped, so dropping it
/// is fine from any context.
struct Detached(Option<Runtime>);

impl Drop for Detached {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

/// Result of one dispatched call. Resolves exactly once.
///
/// Dropping it, or the client that issued it, does not cancel the call.
#[derive(Debug)]
#[must_use = "the call runs regardless, but its result is only observable by awaiting"]
pub struct Pending<T> {
    task: JoinHandle<T>,
    interrupted: Option<T>,
}

impl<T: Unpin> Future for Pending<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = self.get_mut();
        match this.task.poll_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(value)) => Poll::Ready(value),
            Poll::Ready(Err(e)) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Poll::Ready(Err(_)) => match this.interrupted.take() {
                Some(value) => Poll::Ready(value),
                None => panic!("Pending polled after completion"),
            },
        }
    }
}
