use flatset_queue::QueueError;

/// Errors from collection operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the backing storage, other than "not found" on load.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON array.
    #[error("malformed collection file: {0}")]
    Parse(#[source] serde_json::Error),

    /// An item could not be converted to or from its JSON form.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A single item was refused admission.
    #[error("item rejected ({reason}): {item}")]
    Validation { item: String, reason: String },

    /// A generated id does not fit the item type's `id` field.
    #[error("generated id {id} does not fit the item's id field: {reason}")]
    IdRejected { id: String, reason: String },

    /// Every item of a non-empty batch was refused; nothing was stored.
    #[error("no valid items in batch of {rejected}")]
    EmptyBatch { rejected: usize },

    /// The storage backend refuses writes.
    #[error("storage is read-only")]
    ReadOnly,

    /// The operation queue could not run the operation.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
