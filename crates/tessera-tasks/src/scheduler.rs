//! Fixed worker pool feeding a single-consumer completion queue.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, error, trace};

use crate::handle::{StateCell, TaskHandle, TaskState};

type Callback<C> = Box<dyn FnOnce(&mut C) + Send>;

struct Job<C> {
    id: u64,
    state: StateCell,
    run: Box<dyn FnOnce() -> Callback<C> + Send>,
}

struct Completion<C> {
    id: u64,
    state: StateCell,
    callback: Callback<C>,
}

/// Resolve a configured worker count; 0 picks one less than the number of
/// logical CPUs, at least one.
pub fn worker_count(requested: usize) -> usize {
    if requested > 0 {
        requested
    } else {
        num_cpus::get().saturating_sub(1).max(1)
    }
}

/// Runs compute closures on worker threads and hands their results back to
/// callbacks that receive `&mut C` on the draining thread.
///
/// No ordering holds between independently submitted tasks, and there is no
/// cancellation: every successful task is eventually delivered, so callbacks
/// must tolerate results their owner no longer needs.
pub struct ComputeScheduler<C> {
    job_sender: Option<Sender<Job<C>>>,
    completion_receiver: Receiver<Completion<C>>,
    workers: Vec<JoinHandle<()>>,
    in_flight: Arc<AtomicU64>,
    next_id: u64,
}

impl<C: 'static> ComputeScheduler<C> {
    /// Spawn `worker_count(workers)` named worker threads.
    ///
    /// # Panics
    ///
    /// Panics if a worker thread cannot be spawned.
    pub fn new(workers: usize) -> Self {
        let count = worker_count(workers);
        let (job_sender, job_receiver) = unbounded::<Job<C>>();
        let (completion_sender, completion_receiver) = unbounded::<Completion<C>>();
        let in_flight = Arc::new(AtomicU64::new(0));

        let workers = (0..count)
            .map(|index| {
                let jobs = job_receiver.clone();
                let completions = completion_sender.clone();
                let in_flight = Arc::clone(&in_flight);
                std::thread::Builder::new()
                    .name(format!("tessera-worker-{index}"))
                    .spawn(move || worker_loop(jobs, completions, in_flight))
                    .expect("failed to spawn compute worker thread")
            })
            .collect();

        debug!(workers = count, "compute scheduler started");
        Self {
            job_sender: Some(job_sender),
            completion_receiver,
            workers,
            in_flight,
            next_id: 0,
        }
    }

    /// Queue `compute` for a worker. Once it returns, `on_complete` runs with
    /// its result during a later [`drain`](Self::drain).
    pub fn submit<R, F, G>(&mut self, compute: F, on_complete: G) -> TaskHandle
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
        G: FnOnce(&mut C, R) + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        let state = StateCell::new();
        let handle = TaskHandle::new(id, state.clone());

        let job = Job {
            id,
            state: state.clone(),
            run: Box::new(move || {
                let result = compute();
                Box::new(move |context: &mut C| on_complete(context, result)) as Callback<C>
            }),
        };

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let sent = self
            .job_sender
            .as_ref()
            .is_some_and(|sender| sender.send(job).is_ok());
        if !sent {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            state.set(TaskState::Failed);
            error!(task = id, "compute scheduler is shut down; task dropped");
        }
        handle
    }

    /// Run the callbacks of finished tasks, at most `max` of them when
    /// `max > 0`. Returns the number delivered.
    pub fn drain(&mut self, context: &mut C, max: usize) -> usize {
        let mut delivered = 0;
        while max == 0 || delivered < max {
            let Ok(completion) = self.completion_receiver.try_recv() else {
                break;
            };
            (completion.callback)(context);
            completion.state.set(TaskState::Delivered);
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            trace!(task = completion.id, "task delivered");
            delivered += 1;
        }
        delivered
    }

    /// Tasks submitted but neither delivered nor failed.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Results waiting for the next drain.
    pub fn ready_count(&self) -> usize {
        self.completion_receiver.len()
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight() == 0
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stop accepting work and join the workers after they finish the queue.
    /// Undelivered results stay drainable.
    pub fn shutdown(&mut self) {
        if self.job_sender.take().is_none() {
            return;
        }
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("compute worker exited abnormally");
            }
        }
        debug!("compute scheduler stopped");
    }
}

impl<C> Drop for ComputeScheduler<C> {
    fn drop(&mut self) {
        // Dropping the sender ends each worker's receive loop.
        self.job_sender = None;
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop<C>(jobs: Receiver<Job<C>>, completions: Sender<Completion<C>>, in_flight: Arc<AtomicU64>) {
    while let Ok(job) = jobs.recv() {
        job.state.set(TaskState::Running);
        match panic::catch_unwind(AssertUnwindSafe(job.run)) {
            Ok(callback) => {
                job.state.set(TaskState::Completed);
                let completion = Completion {
                    id: job.id,
                    state: job.state,
                    callback,
                };
                if completions.send(completion).is_err() {
                    // Scheduler dropped; nobody will drain this.
                    in_flight.fetch_sub(1, Ordering::AcqRel);
                }
            }
            Err(payload) => {
                job.state.set(TaskState::Failed);
                in_flight.fetch_sub(1, Ordering::AcqRel);
                error!(task = job.id, reason = panic_message(&*payload), "compute task panicked");
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
