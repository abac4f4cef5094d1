//! Observable task state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a submitted task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    /// Waiting for a free worker.
    Queued = 0,
    /// Compute closure executing on a worker.
    Running = 1,
    /// Result queued, callback not yet run.
    Completed = 2,
    /// Callback has run on the consumer thread.
    Delivered = 3,
    /// Compute closure panicked; the callback will never run.
    Failed = 4,
}

impl TaskState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Queued,
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::Delivered,
            _ => Self::Failed,
        }
    }

    /// Delivered or failed.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Delivered | Self::Failed)
    }
}

/// Shared state cell between a handle and the scheduler.
#[derive(Clone, Debug)]
pub(crate) struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicU8::new(TaskState::Queued as u8)))
    }

    pub(crate) fn set(&self, state: TaskState) {
        self.0.store(state as u8, Ordering::Release);
    }

    pub(crate) fn get(&self) -> TaskState {
        TaskState::from_u8(self.0.load(Ordering::Acquire))
    }
}

/// Handle returned by [`crate::ComputeScheduler::submit`].
///
/// Dropping it does not cancel the task.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    id: u64,
    state: StateCell,
}

impl TaskHandle {
    pub(crate) fn new(id: u64, state: StateCell) -> Self {
        Self { id, state }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> TaskState {
        self.state.get()
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }
}
