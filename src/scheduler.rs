//! # Job Scheduling
//!
//! Metadata jobs never manage threads themselves. They are described as
//! [`Task`]s and handed to a [`Scheduler`], which owns their execution and
//! tracks their state. The jobs only need two things from a scheduler:
//! submitting a task, and listing the tracked jobs of a given type.
//!
//! [`InProcessScheduler`] is the implementation used by the command-line tool
//! and the tests. It runs tasks on a bounded `rayon` thread pool.
//!
//! ## Admission
//!
//! Before a task is queued the scheduler asks it for admission
//! ([`Task::admit`]). The check happens inside `submit`, so it happens-before
//! execution, and the returned guard is held until the task finishes. A task
//! that is refused ends in [`JobState::Rejected`]; that is not an error, the
//! caller may simply submit it again later.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};

use log::{debug, error, info};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::generator::YumRepository;

/// Lifecycle of a scheduled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    /// Submitted and admitted, waiting for a worker.
    Init,
    Running,
    Success,
    Failed,
    /// Refused at admission; never ran.
    Rejected,
}

impl JobState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            JobState::Success | JobState::Failed | JobState::Rejected
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobState::Init => "INIT",
            JobState::Running => "RUNNING",
            JobState::Success => "SUCCESS",
            JobState::Failed => "FAILED",
            JobState::Rejected => "REJECTED",
        };
        f.write_str(label)
    }
}

/// Held by the scheduler while an admitted task is queued or running.
/// Dropping it releases whatever the task reserved at admission.
pub type AdmissionGuard = Box<dyn Send>;

/// Outcome of [`Task::admit`].
pub enum Admission {
    Admitted(AdmissionGuard),
    Denied(String),
}

impl fmt::Debug for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Admission::Admitted(_) => f.write_str("Admitted"),
            Admission::Denied(reason) => f.debug_tuple("Denied").field(reason).finish(),
        }
    }
}

/// A unit of work run by a [`Scheduler`].
pub trait Task: Send + Sync {
    /// Identifier shared by all tasks of the same kind.
    fn job_type(&self) -> &'static str;

    /// Short action label recorded in the job history.
    fn action(&self) -> &'static str;

    /// Human readable description recorded in the job history.
    fn message(&self) -> String;

    /// Decides whether the task may run now.
    fn admit(&self) -> Admission {
        Admission::Admitted(Box::new(()))
    }

    fn run(&self) -> Result<Option<YumRepository>>;
}

/// Submits tasks and exposes the jobs it tracks.
pub trait Scheduler: Send + Sync {
    fn submit(&self, task: Arc<dyn Task>) -> Result<JobHandle>;

    /// All tracked jobs of the given type, finished ones included.
    fn jobs_of_type(&self, job_type: &str) -> Vec<JobHandle>;

    /// Number of jobs allowed to run at the same time.
    fn max_parallel_threads(&self) -> usize;

    /// Changes how many jobs may run at the same time. Jobs already
    /// submitted are not affected.
    fn set_max_parallel_threads(&self, threads: usize) -> Result<()>;
}

#[derive(Debug)]
struct JobStatus {
    state: JobState,
    result: Option<YumRepository>,
    error: Option<String>,
}

#[derive(Debug)]
struct JobRecord {
    id: u64,
    job_type: &'static str,
    action: &'static str,
    message: String,
    status: Mutex<JobStatus>,
    finished: Condvar,
}

/// Shared view of a submitted job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    record: Arc<JobRecord>,
}

impl JobHandle {
    /// Creates a handle in the `Init` state for `task`.
    pub fn new(id: u64, task: &dyn Task) -> Self {
        Self {
            record: Arc::new(JobRecord {
                id,
                job_type: task.job_type(),
                action: task.action(),
                message: task.message(),
                status: Mutex::new(JobStatus {
                    state: JobState::Init,
                    result: None,
                    error: None,
                }),
                finished: Condvar::new(),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.record.id
    }

    pub fn job_type(&self) -> &'static str {
        self.record.job_type
    }

    pub fn action(&self) -> &'static str {
        self.record.action
    }

    pub fn message(&self) -> &str {
        &self.record.message
    }

    pub fn state(&self) -> JobState {
        self.status().state
    }

    /// Repository produced by a successful job.
    pub fn result(&self) -> Option<YumRepository> {
        self.status().result.clone()
    }

    /// Failure or rejection reason.
    pub fn error(&self) -> Option<String> {
        self.status().error.clone()
    }

    /// Blocks until the job has finished and returns its final state.
    pub fn wait(&self) -> JobState {
        let mut status = self.status();
        while !status.state.is_finished() {
            status = self
                .record
                .finished
                .wait(status)
                .unwrap_or_else(PoisonError::into_inner);
        }
        status.state
    }

    pub fn set_running(&self) {
        self.status().state = JobState::Running;
    }

    pub fn succeed(&self, result: Option<YumRepository>) {
        self.finish(JobState::Success, result, None);
    }

    pub fn fail(&self, error: impl Into<String>) {
        self.finish(JobState::Failed, None, Some(error.into()));
    }

    pub fn reject(&self, reason: impl Into<String>) {
        self.finish(JobState::Rejected, None, Some(reason.into()));
    }

    fn finish(&self, state: JobState, result: Option<YumRepository>, error: Option<String>) {
        let mut status = self.status();
        status.state = state;
        status.result = result;
        status.error = error;
        drop(status);
        self.record.finished.notify_all();
    }

    fn status(&self) -> MutexGuard<'_, JobStatus> {
        self.record
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Finished jobs kept for [`Scheduler::jobs_of_type`] by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Runs tasks on a bounded worker pool inside the current process.
///
/// The job table keeps every unfinished job. Once it grows past the history
/// limit the oldest finished jobs are dropped from it.
pub struct InProcessScheduler {
    pool: RwLock<Arc<rayon::ThreadPool>>,
    jobs: Mutex<Vec<JobHandle>>,
    next_id: AtomicU64,
    history_limit: usize,
}

impl fmt::Debug for InProcessScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InProcessScheduler")
            .field("threads", &self.max_parallel_threads())
            .field("history_limit", &self.history_limit)
            .finish()
    }
}

impl InProcessScheduler {
    /// Creates a scheduler running at most `threads` jobs at a time.
    pub fn new(threads: usize) -> Result<Self> {
        Ok(Self {
            pool: RwLock::new(Arc::new(build_pool(threads)?)),
            jobs: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            history_limit: DEFAULT_HISTORY_LIMIT,
        })
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Every tracked job, in submission order.
    pub fn jobs(&self) -> Vec<JobHandle> {
        self.lock_jobs().clone()
    }

    /// Waits for every tracked job to finish.
    pub fn wait_all(&self) {
        for job in self.jobs() {
            job.wait();
        }
    }

    fn track(&self, handle: JobHandle) {
        let mut jobs = self.lock_jobs();
        jobs.push(handle);

        let mut excess = jobs.len().saturating_sub(self.history_limit);
        if excess == 0 {
            return;
        }
        jobs.retain(|job| {
            if excess > 0 && job.state().is_finished() {
                excess -= 1;
                false
            } else {
                true
            }
        });
    }

    fn current_pool(&self) -> Arc<rayon::ThreadPool> {
        Arc::clone(&self.pool.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn lock_jobs(&self) -> MutexGuard<'_, Vec<JobHandle>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn build_pool(threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|i| format!("yum-metadata-{}", i))
        .build()
        .map_err(|e| Error::Scheduler {
            message: e.to_string(),
        })
}

impl Scheduler for InProcessScheduler {
    fn submit(&self, task: Arc<dyn Task>) -> Result<JobHandle> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = JobHandle::new(id, task.as_ref());
        self.track(handle.clone());

        let guard = match task.admit() {
            Admission::Admitted(guard) => guard,
            Admission::Denied(reason) => {
                info!("Not running {} job #{}: {}", handle.job_type(), id, reason);
                handle.reject(reason);
                return Ok(handle);
            }
        };

        let job = handle.clone();
        self.current_pool().spawn(move || {
            job.set_running();
            info!("{}: {}", job.action(), job.message());

            let outcome = catch_unwind(AssertUnwindSafe(|| task.run()));
            drop(guard);

            match outcome {
                Ok(Ok(result)) => {
                    debug!("{} job #{} finished", job.job_type(), job.id());
                    job.succeed(result);
                }
                Ok(Err(e)) => {
                    error!("{} job #{} failed: {}", job.job_type(), job.id(), e);
                    job.fail(e.to_string());
                }
                Err(_) => {
                    error!("{} job #{} panicked", job.job_type(), job.id());
                    job.fail("job panicked");
                }
            }
        });

        Ok(handle)
    }

    fn jobs_of_type(&self, job_type: &str) -> Vec<JobHandle> {
        self.lock_jobs()
            .iter()
            .filter(|job| job.job_type() == job_type)
            .cloned()
            .collect()
    }

    fn max_parallel_threads(&self) -> usize {
        self.current_pool().current_num_threads()
    }

    fn set_max_parallel_threads(&self, threads: usize) -> Result<()> {
        if threads == self.max_parallel_threads() {
            return Ok(());
        }
        let pool = Arc::new(build_pool(threads)?);
        // The replaced pool finishes the jobs already spawned on it.
        *self.pool.write().unwrap_or_else(PoisonError::into_inner) = pool;
        debug!("Job scheduler resized to {} threads", threads.max(1));
        Ok(())
    }
}
