//! The [`OperationQueue`] and its [`Pending`] result future.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::error::QueueError;

/// A type-erased queued operation. Its result is delivered through the
/// oneshot channel captured inside the future.
type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Job>,
    /// `true` while a drain loop is alive. Only the loop itself clears it,
    /// and only while holding the lock with `pending` empty.
    draining: bool,
}

/// Single-consumer FIFO scheduler for asynchronous operations.
///
/// Cloning the queue yields another handle to the same pending list, so
/// clones share ordering and exclusivity.
#[derive(Clone, Default)]
pub struct OperationQueue {
    state: Arc<Mutex<QueueState>>,
}

impl OperationQueue {
    /// Create an empty, idle queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit an operation.
    ///
    /// The operation is appended to the pending list immediately, before the
    /// returned future is first polled, so submission order is call order.
    /// If no drain loop is running one is spawned on the current tokio
    /// runtime; otherwise the running loop picks the operation up.
    ///
    /// The returned [`Pending`] resolves with the operation's own result.
    /// Queue-level failures are converted into `E` via `From<QueueError>`.
    pub fn enqueue<F, Fut, T, E>(&self, op: F) -> Pending<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: From<QueueError> + Send + 'static,
    {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("operation submitted outside of a tokio runtime");
                return Pending::failed(QueueError::NoRuntime);
            }
        };

        let (tx, rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let outcome = op().await;
            // A dropped receiver only means the caller stopped waiting.
            let _ = tx.send(outcome);
        });

        let start_drain = {
            let mut state = self.lock();
            state.pending.push_back(job);
            trace!(pending = state.pending.len(), "operation enqueued");
            !std::mem::replace(&mut state.draining, true)
        };

        if start_drain {
            debug!("starting drain loop");
            handle.spawn(drain(DrainGuard::new(Arc::clone(&self.state))));
        }

        Pending::waiting(rx)
    }

    /// Number of operations waiting to start (excludes the one running).
    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Returns `true` if no operation is waiting to start.
    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }

    /// Returns `true` while a drain loop is alive.
    pub fn is_draining(&self) -> bool {
        self.lock().draining
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().expect("queue lock poisoned")
    }
}

impl fmt::Debug for OperationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("OperationQueue")
            .field("pending", &state.pending.len())
            .field("draining", &state.draining)
            .finish()
    }
}

/// Ownership of the `draining` flag, held by the drain task.
///
/// If the task is dropped before the loop finishes (runtime shutdown, or a
/// spawned task that never got polled), the guard releases the queue and
/// drops every waiting job so its caller resolves to `Aborted`.
struct DrainGuard {
    state: Arc<Mutex<QueueState>>,
    finished: bool,
}

impl DrainGuard {
    fn new(state: Arc<Mutex<QueueState>>) -> Self {
        Self {
            state,
            finished: false,
        }
    }
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let abandoned = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.draining = false;
            std::mem::take(&mut state.pending)
        };
        if !abandoned.is_empty() {
            warn!(abandoned = abandoned.len(), "drain loop cancelled, dropping waiting operations");
        }
        // Jobs are dropped outside the lock.
        drop(abandoned);
    }
}

/// The single drain loop. Pops one job at a time and awaits it before
/// looking at the list again.
async fn drain(mut guard: DrainGuard) {
    let mut executed = 0usize;
    loop {
        let job = {
            let mut state = guard.state.lock().expect("queue lock poisoned");
            match state.pending.pop_front() {
                Some(job) => job,
                None => {
                    state.draining = false;
                    break;
                }
            }
        };

        // Spawned so a panicking operation cannot take the loop down with it.
        if let Err(err) = tokio::spawn(job).await {
            warn!(error = %err, "queued operation aborted");
        }
        executed += 1;
    }
    guard.finished = true;
    debug!(executed, "drain loop idle");
}

enum PendingState<T, E> {
    Waiting(oneshot::Receiver<Result<T, E>>),
    Failed(Option<QueueError>),
}

/// Future returned by [`OperationQueue::enqueue`].
///
/// Resolves once the operation has run. If the operation panicked the
/// result is `Err(QueueError::Aborted.into())`.
#[must_use = "the operation runs regardless, but its result is lost unless awaited"]
pub struct Pending<T, E> {
    state: PendingState<T, E>,
    _error: PhantomData<fn() -> E>,
}

impl<T, E> Pending<T, E> {
    fn waiting(rx: oneshot::Receiver<Result<T, E>>) -> Self {
        Self {
            state: PendingState::Waiting(rx),
            _error: PhantomData,
        }
    }

    fn failed(err: QueueError) -> Self {
        Self {
            state: PendingState::Failed(Some(err)),
            _error: PhantomData,
        }
    }
}

impl<T, E> Unpin for Pending<T, E> {}

impl<T, E> Future for Pending<T, E>
where
    E: From<QueueError>,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            PendingState::Waiting(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
                Poll::Ready(Err(_)) => Poll::Ready(Err(QueueError::Aborted.into())),
                Poll::Pending => Poll::Pending,
            },
            PendingState::Failed(err) => {
                let err = err.take().unwrap_or(QueueError::Aborted);
                Poll::Ready(Err(err.into()))
            }
        }
    }
}

impl<T, E> fmt::Debug for Pending<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            PendingState::Waiting(_) => "waiting",
            PendingState::Failed(_) => "failed",
        };
        f.debug_struct("Pending").field("state", &state).finish()
    }
}
