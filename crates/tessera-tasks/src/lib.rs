//! Background compute scheduling with single-consumer result delivery.
//!
//! Pure compute closures run on a fixed pool of worker threads. Each finished
//! result is queued together with its completion callback; the owning thread
//! drains the queue once per tick and runs the callbacks against its own
//! mutable state, so workers never touch that state.

mod handle;
mod scheduler;

pub use handle::{TaskHandle, TaskState};
pub use scheduler::{ComputeScheduler, worker_count};
