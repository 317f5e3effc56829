//! Error types for queue operations.

/// Failures raised by the queue itself rather than by a queued operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The operation panicked, or its result was lost before delivery.
    #[error("queued operation aborted before producing a result")]
    Aborted,

    /// `enqueue` was called outside of a tokio runtime.
    #[error("no tokio runtime available to drive the operation queue")]
    NoRuntime,
}

/// Convenience alias used throughout the queue crate.
pub type Result<T> = std::result::Result<T, QueueError>;
