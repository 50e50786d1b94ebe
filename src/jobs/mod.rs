//! JobCenter - background job execution with main-thread result delivery.
//!
//! One `JobCenter` owns at most one worker thread at a time. A work closure
//! runs on that dedicated thread and must only compute over data captured in
//! the closure; host-UI and host-document state belong to the main thread
//! alone. The closure's `Result` outcome crosses the thread boundary as a
//! plain value through an mpsc channel, never as a panic or an exception
//! path, and is delivered when the host's main loop calls [`JobCenter::drain`].
//!
//! Submitting while a previous job is still running blocks the caller for a
//! bounded retire wait, then proceeds anyway with a warning. This is a known
//! serialization point, not a queue; callers needing concurrent jobs use
//! multiple `JobCenter` instances.

use crate::bus::EventBus;
use crate::types::{JobConfig, JobId, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Topic published when a job's closure returns successfully.
pub const TOPIC_JOB_DONE: &str = "job/done";
/// Topic published when a job's closure fails.
pub const TOPIC_JOB_FAILED: &str = "job/failed";

/// Completion callback, invoked on the main thread for successful jobs only.
/// Errors are caught and logged, never propagated.
pub type JobCallback = Box<dyn FnOnce(&Value) -> Result<()> + Send>;

/// Outcome crossing from the worker thread to the main thread.
struct Completion {
    job_id: JobId,
    outcome: Result<Value>,
}

/// The one active worker slot.
struct ActiveWorker {
    job_id: JobId,
    handle: JoinHandle<()>,
    finished: Arc<AtomicBool>,
}

struct Inner {
    next_job: u64,
    active: Option<ActiveWorker>,
    /// Callbacks parked until the matching completion is drained. Stored on
    /// the main-thread side; they never cross into the worker.
    callbacks: HashMap<JobId, JobCallback>,
}

/// Background job executor with a single worker slot.
pub struct JobCenter {
    event_bus: Option<Arc<EventBus>>,
    config: JobConfig,
    tx: Sender<Completion>,
    rx: Mutex<Receiver<Completion>>,
    inner: Mutex<Inner>,
}

impl JobCenter {
    /// Create a job center, optionally wired to an event bus for
    /// `job/done` / `job/failed` publication.
    pub fn new(event_bus: Option<Arc<EventBus>>, config: JobConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            event_bus,
            config,
            tx,
            rx: Mutex::new(rx),
            inner: Mutex::new(Inner {
                next_job: 0,
                active: None,
                callbacks: HashMap::new(),
            }),
        }
    }

    /// Run `work` on a dedicated worker thread, with no completion callback.
    ///
    /// The closure must not touch host state; it may only compute over what
    /// it captured and return a plain value. Outcome events are still
    /// published on drain.
    pub fn run_in_thread<F>(&self, work: F) -> JobId
    where
        F: FnOnce() -> Result<Value> + Send + 'static,
    {
        self.submit(Box::new(work), None)
    }

    /// Run `work` on a dedicated worker thread and invoke `callback` with the
    /// result on the main thread once [`drain`](Self::drain) processes the
    /// completion. The callback is skipped when the closure fails.
    pub fn run_with_callback<F, C>(&self, work: F, callback: C) -> JobId
    where
        F: FnOnce() -> Result<Value> + Send + 'static,
        C: FnOnce(&Value) -> Result<()> + Send + 'static,
    {
        self.submit(Box::new(work), Some(Box::new(callback)))
    }

    fn submit(
        &self,
        work: Box<dyn FnOnce() -> Result<Value> + Send>,
        callback: Option<JobCallback>,
    ) -> JobId {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        inner.next_job += 1;
        let job_id = JobId(inner.next_job);
        tracing::info!(job = %job_id, "submitting background job");

        if let Some(previous) = inner.active.take() {
            self.retire(previous);
        }

        if let Some(callback) = callback {
            inner.callbacks.insert(job_id, callback);
        }

        let finished = Arc::new(AtomicBool::new(false));
        let worker_finished = Arc::clone(&finished);
        let tx = self.tx.clone();
        let handle = std::thread::spawn(move || {
            tracing::debug!(job = %job_id, "worker thread started");
            let outcome = work();
            // Channel send happens before the finished flag flips, so a
            // drain gated on is_running() always sees the completion.
            let _ = tx.send(Completion { job_id, outcome });
            worker_finished.store(true, Ordering::SeqCst);
        });

        inner.active = Some(ActiveWorker {
            job_id,
            handle,
            finished,
        });
        job_id
    }

    /// Bounded wait for a previous worker. There is no preemption point in an
    /// opaque closure, so "stop" is the wait itself; on timeout the worker is
    /// detached and its eventual completion still drains normally.
    fn retire(&self, previous: ActiveWorker) {
        if previous.finished.load(Ordering::SeqCst) {
            let _ = previous.handle.join();
            return;
        }

        tracing::warn!(
            job = %previous.job_id,
            "previous job still running, waiting for completion"
        );
        let deadline = Instant::now() + self.config.retire_timeout;
        while !previous.finished.load(Ordering::SeqCst) && Instant::now() < deadline {
            std::thread::sleep(self.config.retire_poll_interval);
        }

        if previous.finished.load(Ordering::SeqCst) {
            let _ = previous.handle.join();
        } else {
            // Never deadlock the main thread on a stuck closure.
            tracing::warn!(
                job = %previous.job_id,
                timeout = ?self.config.retire_timeout,
                "worker did not stop in time, detaching"
            );
            drop(previous.handle);
        }
    }

    /// Whether a worker thread is currently executing a closure.
    pub fn is_running(&self) -> bool {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .active
            .as_ref()
            .is_some_and(|worker| !worker.finished.load(Ordering::SeqCst))
    }

    /// Deliver all pending completions on the calling thread.
    ///
    /// This is the marshaling point: the host's main loop calls it, making it
    /// the only place callbacks run and outcome events publish. Returns the
    /// number of completions delivered.
    pub fn drain(&self) -> usize {
        let rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        let mut delivered = 0;
        loop {
            match rx.try_recv() {
                Ok(completion) => {
                    self.deliver(completion);
                    delivered += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        delivered
    }

    /// Poll until the active worker settles or `timeout` elapses. Returns
    /// `true` when settled. Convenience for hosts that want to flush jobs at
    /// a known point (and for tests).
    pub fn wait_settled(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.is_running() {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(self.config.retire_poll_interval);
        }
        true
    }

    fn deliver(&self, completion: Completion) {
        let job_id = completion.job_id;
        let callback = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // Free the slot once its completion is delivered.
            if let Some(worker) = inner.active.take() {
                if worker.job_id == job_id {
                    let _ = worker.handle.join();
                } else {
                    inner.active = Some(worker);
                }
            }
            inner.callbacks.remove(&job_id)
        };

        match completion.outcome {
            Ok(result) => {
                tracing::info!(job = %job_id, "job completed");
                if let Some(callback) = callback {
                    if let Err(err) = callback(&result) {
                        tracing::error!(job = %job_id, error = %err, "job callback failed");
                    }
                }
                if let Some(bus) = &self.event_bus {
                    bus.publish(
                        TOPIC_JOB_DONE,
                        json!({
                            "jobId": job_id.0,
                            "result": result,
                            "status": "completed",
                        }),
                    );
                }
            }
            Err(err) => {
                // Callback is intentionally not invoked on failure.
                tracing::error!(job = %job_id, error = %err, "job failed");
                if let Some(bus) = &self.event_bus {
                    bus.publish(
                        TOPIC_JOB_FAILED,
                        json!({
                            "jobId": job_id.0,
                            "error": err.to_string(),
                            "errorType": err.kind(),
                            "status": "failed",
                        }),
                    );
                }
            }
        }
    }
}

impl fmt::Debug for JobCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("JobCenter")
            .field("jobs_submitted", &inner.next_job)
            .field("running", &inner.active.is_some())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
