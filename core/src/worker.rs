//! Single-worker bounded task runner.
//!
//! The worker owns a small tokio runtime. One `spawn_blocking` loop runs
//! engine calls strictly in submission order, fed through a bounded queue.
//! Callers block on the runtime under a wall-clock deadline that covers both
//! the queue wait and the engine call. When the deadline passes the task's
//! token is cancelled and the caller moves on; the loop stays occupied until
//! the engine returns, so a non-cooperative engine leaves later tasks queued
//! behind it.
//!
//! Every task token is a child of the worker's shutdown token, so
//! [`Worker::shutdown`] cancels the in-flight task and every queued one, and
//! wakes all waiting callers at once.
//!
//! [`Worker::run`] blocks the calling thread and must not be called from
//! inside an async context.

use std::any::Any;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::{mpsc, oneshot};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use timex_engine::{EngineFailure, Temporal, TemporalEngine};
use timex_types::AnchorPoint;

use crate::diagnostics::Diagnostics;

const WORKER_THREAD_NAME: &str = "timex-worker";

/// Tasks that may wait behind the one in flight. Once full, callers spend
/// their deadline waiting for a free slot instead of growing the queue.
pub const QUEUE_CAPACITY: usize = 32;

/// What the worker loop is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Idle,
    /// An engine call is in flight. `cancel_requested` stays set after its
    /// caller timed out until the engine actually returns.
    Busy {
        since: Instant,
        cancel_requested: bool,
    },
}

impl Occupancy {
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Occupancy::Busy { .. })
    }
}

/// Result of waiting on one submitted task.
#[derive(Debug)]
pub enum TaskOutcome {
    Finished(Result<Temporal, EngineFailure>),
    DeadlineExceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("worker has been shut down")]
pub struct WorkerClosed;

type Reply = Result<Temporal, EngineFailure>;

struct Job {
    text: String,
    anchor: AnchorPoint,
    cancel: CancellationToken,
    reply: oneshot::Sender<Reply>,
}

enum Slot {
    Idle,
    Busy {
        since: Instant,
        cancel: CancellationToken,
    },
}

struct Shared {
    slot: Mutex<Slot>,
    shutdown: CancellationToken,
    diagnostics: Arc<Diagnostics>,
}

/// Exclusively owned worker. Shut down on [`Worker::shutdown`] or drop.
pub struct Worker {
    jobs: Mutex<Option<mpsc::Sender<Job>>>,
    runtime: RwLock<Option<Runtime>>,
    shared: Arc<Shared>,
}

impl Worker {
    pub fn spawn(
        engine: Arc<dyn TemporalEngine>,
        diagnostics: Arc<Diagnostics>,
    ) -> io::Result<Self> {
        Self::with_capacity(engine, diagnostics, QUEUE_CAPACITY)
    }

    pub fn with_capacity(
        engine: Arc<dyn TemporalEngine>,
        diagnostics: Arc<Diagnostics>,
        capacity: usize,
    ) -> io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(1)
            .thread_name(WORKER_THREAD_NAME)
            .enable_time()
            .build()?;

        let (jobs, queue) = mpsc::channel(capacity.max(1));
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::Idle),
            shutdown: CancellationToken::new(),
            diagnostics,
        });
        let loop_shared = Arc::clone(&shared);
        let _detached =
            runtime.spawn_blocking(move || worker_loop(queue, engine.as_ref(), &loop_shared));

        Ok(Self {
            jobs: Mutex::new(Some(jobs)),
            runtime: RwLock::new(Some(runtime)),
            shared,
        })
    }

    /// Submit one engine call and wait at most `timeout` for its result.
    ///
    /// The deadline covers time spent queued behind earlier tasks. Returns
    /// [`WorkerClosed`] as soon as the worker shuts down, whether the task was
    /// queued or in flight.
    pub fn run(
        &self,
        text: &str,
        anchor: AnchorPoint,
        timeout: Duration,
    ) -> Result<TaskOutcome, WorkerClosed> {
        let runtime = read(&self.runtime);
        let runtime = runtime.as_ref().ok_or(WorkerClosed)?;
        let jobs = lock(&self.jobs).clone().ok_or(WorkerClosed)?;

        let shutdown = self.shared.shutdown.clone();
        let cancel = shutdown.child_token();
        let (reply, result) = oneshot::channel();
        let job = Job {
            text: text.to_string(),
            anchor,
            cancel: cancel.clone(),
            reply,
        };
        let exchange = async move {
            jobs.send(job).await.map_err(|_| WorkerClosed)?;
            result.await.map_err(|_| WorkerClosed)
        };

        let waited = runtime.block_on(async {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => Err(WorkerClosed),
                outcome = time::timeout(timeout, exchange) => match outcome {
                    Ok(reply) => reply.map(TaskOutcome::Finished),
                    Err(_) => Ok(TaskOutcome::DeadlineExceeded),
                },
            }
        });

        if matches!(waited, Ok(TaskOutcome::DeadlineExceeded)) {
            cancel.cancel();
            debug!(
                text,
                timeout_ms = timeout.as_millis() as u64,
                "deadline exceeded, cancellation requested"
            );
        }
        waited
    }

    #[must_use]
    pub fn occupancy(&self) -> Occupancy {
        match &*lock(&self.shared.slot) {
            Slot::Idle => Occupancy::Idle,
            Slot::Busy { since, cancel } => Occupancy::Busy {
                since: *since,
                cancel_requested: cancel.is_cancelled(),
            },
        }
    }

    /// Tasks accepted but not yet started, including ones whose callers have
    /// already given up.
    #[must_use]
    pub fn queued(&self) -> usize {
        lock(&self.jobs)
            .as_ref()
            .map_or(0, |jobs| jobs.max_capacity() - jobs.capacity())
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shared.shutdown.is_cancelled()
    }

    /// Stop accepting tasks, cancel the in-flight and queued ones, release
    /// every waiting caller, and shut the runtime down in the background.
    ///
    /// Never waits on the engine. Returns `false` if already shut down.
    pub fn shutdown(&self) -> bool {
        let Some(jobs) = lock(&self.jobs).take() else {
            return false;
        };
        {
            // Taken with the slot lock so the loop cannot start another task
            // after observing an open worker.
            let _slot = lock(&self.shared.slot);
            self.shared.shutdown.cancel();
        }
        drop(jobs);

        // Waiters hold the read side only until the cancellation wakes them.
        if let Some(runtime) = write(&self.runtime).take() {
            runtime.shutdown_background();
        }
        debug!("worker shut down");
        true
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("occupancy", &self.occupancy())
            .field("queued", &self.queued())
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

fn worker_loop(mut queue: mpsc::Receiver<Job>, engine: &dyn TemporalEngine, shared: &Shared) {
    while let Some(job) = queue.blocking_recv() {
        let started = Instant::now();
        {
            let mut slot = lock(&shared.slot);
            if shared.shutdown.is_cancelled() {
                debug!("worker shut down, dropping queued tasks");
                break;
            }
            if job.cancel.is_cancelled() {
                debug!(text = %job.text, "skipping task cancelled while queued");
                shared.diagnostics.record_stale();
                continue;
            }
            *slot = Slot::Busy {
                since: started,
                cancel: job.cancel.clone(),
            };
        }
        shared.diagnostics.record_engine_call();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            engine.parse(&job.text, &job.anchor, &job.cancel)
        }))
        .unwrap_or_else(|payload| Err(EngineFailure::new(panic_description(payload.as_ref()))));

        *lock(&shared.slot) = Slot::Idle;

        if job.reply.send(result).is_err() {
            debug!(
                text = %job.text,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "discarding result of abandoned task"
            );
            shared.diagnostics.record_stale();
        }
    }
}

fn panic_description(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    format!("engine panicked: {detail}")
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(rw: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    rw.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(rw: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    rw.write().unwrap_or_else(PoisonError::into_inner)
}
