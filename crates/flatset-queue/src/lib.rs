//! Serialized operation queue for flatset collections.
//!
//! Every read or write that touches a collection's backing file is funnelled
//! through an [`OperationQueue`]. The queue runs operations one at a time, in
//! the exact order they were submitted, which gives mutual exclusion over the
//! in-memory set and the file without any caller-visible lock.
//!
//! # Guarantees
//!
//! 1. Operations start in submission order (the order of `enqueue` calls).
//! 2. At most one operation is executing at any moment.
//! 3. A failing or panicking operation only affects its own [`Pending`]
//!    future; the queue moves on to the next operation.
//! 4. Once enqueued, an operation runs to completion. Dropping the
//!    [`Pending`] does not cancel it.

pub mod error;
pub mod queue;

pub use error::{QueueError, Result};
pub use queue::{OperationQueue, Pending};
