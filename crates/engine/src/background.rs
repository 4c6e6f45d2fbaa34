//! Background rebuild worker.
//!
//! A single named worker thread runs one fixed job (refreshing the modifier
//! index) whenever it is requested. Requests coalesce: asking again while a
//! request is still queued is a no-op, so a burst of saves triggers one
//! rebuild rather than one per save. A request made while the job is running
//! queues exactly one more run.

use parking_lot::{Condvar, Mutex};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error};

#[derive(Debug, Default)]
struct WorkerState {
    pending: bool,
    running: bool,
    shutdown: bool,
    completed: u64,
}

#[derive(Debug, Default)]
struct WorkerInner {
    state: Mutex<WorkerState>,
    work_ready: Condvar,
    idle: Condvar,
}

/// Coalescing single-job background worker
pub struct BackgroundRebuilder {
    inner: Arc<WorkerInner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for BackgroundRebuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundRebuilder")
            .field("completed", &self.completed())
            .finish()
    }
}

impl BackgroundRebuilder {
    /// Spawn the worker thread named `name` running `job` on request
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(name: &str, job: impl Fn() + Send + 'static) -> std::io::Result<Self> {
        let inner = Arc::new(WorkerInner::default());
        let worker_inner = Arc::clone(&inner);
        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(&worker_inner, job))?;

        Ok(Self {
            inner,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Ask for one run of the job
    ///
    /// Returns false if a run was already queued or the worker is shut down.
    pub fn request(&self) -> bool {
        let mut state = self.inner.state.lock();
        if state.shutdown || state.pending {
            return false;
        }
        state.pending = true;
        drop(state);

        self.inner.work_ready.notify_one();
        true
    }

    /// Block until no run is queued or in flight
    pub fn drain(&self) {
        let mut state = self.inner.state.lock();
        while state.pending || state.running {
            self.inner.idle.wait(&mut state);
        }
    }

    /// Number of finished runs
    pub fn completed(&self) -> u64 {
        self.inner.state.lock().completed
    }

    /// Stop the worker after any queued run and join it
    pub fn shutdown(&self) {
        {
            let mut state = self.inner.state.lock();
            state.shutdown = true;
            self.inner.work_ready.notify_all();
        }

        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                error!("Background worker exited abnormally");
            }
        }
    }
}

impl Drop for BackgroundRebuilder {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(inner: &WorkerInner, job: impl Fn()) {
    loop {
        {
            let mut state = inner.state.lock();
            while !state.pending && !state.shutdown {
                inner.work_ready.wait(&mut state);
            }
            if !state.pending {
                break;
            }
            state.pending = false;
            state.running = true;
        }

        if catch_unwind(AssertUnwindSafe(&job)).is_err() {
            error!("Background job panicked");
        }

        let mut state = inner.state.lock();
        state.running = false;
        state.completed += 1;
        inner.idle.notify_all();
    }

    // Wake any drain() callers waiting on a worker that has gone away.
    inner.idle.notify_all();
    debug!("Background worker stopped");
}
