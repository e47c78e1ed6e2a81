//! Admission control for merge jobs.
//!
//! `mergerepo` keeps its working files in a temp-directory namespace shared by
//! every invocation of the same user, so two merges running at once can
//! trample each other. Merges are therefore admitted one at a time across all
//! groups, and a group that is being merged is never admitted twice.
//!
//! Both checks and the reservation happen under one lock, so two submissions
//! can never both observe a free slot. The reservation is held by a
//! [`MergeTicket`] and released when the ticket is dropped.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Maximum number of merge jobs running at the same time.
pub const MAXIMAL_PARALLEL_RUNS: usize = 1;

/// Why a merge was not admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDenied {
    /// A merge of the same group is already admitted.
    GroupAlreadyMerging(String),
    /// The global ceiling of running merges is reached.
    CeilingReached { running: usize, ceiling: usize },
}

impl fmt::Display for AdmissionDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionDenied::GroupAlreadyMerging(group) => {
                write!(f, "group repository '{}' is already being merged", group)
            }
            AdmissionDenied::CeilingReached { running, ceiling } => write!(
                f,
                "{} merge job(s) running, at most {} allowed",
                running, ceiling
            ),
        }
    }
}

#[derive(Debug, Default)]
struct AdmissionState {
    running: usize,
    groups: HashSet<String>,
}

/// Tracks admitted merges per job type.
#[derive(Debug, Clone, Default)]
pub struct MergeAdmission {
    state: Arc<Mutex<AdmissionState>>,
}

impl MergeAdmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admission shared by every merge job of the process.
    pub fn global() -> &'static MergeAdmission {
        static GLOBAL: OnceLock<MergeAdmission> = OnceLock::new();
        GLOBAL.get_or_init(MergeAdmission::new)
    }

    /// Reserves a slot for merging `group_id`.
    pub fn try_admit(&self, group_id: &str) -> Result<MergeTicket, AdmissionDenied> {
        let mut state = self.lock();

        if state.groups.contains(group_id) {
            return Err(AdmissionDenied::GroupAlreadyMerging(group_id.to_string()));
        }
        if state.running >= MAXIMAL_PARALLEL_RUNS {
            return Err(AdmissionDenied::CeilingReached {
                running: state.running,
                ceiling: MAXIMAL_PARALLEL_RUNS,
            });
        }

        state.running += 1;
        state.groups.insert(group_id.to_string());

        Ok(MergeTicket {
            group_id: group_id.to_string(),
            state: Arc::clone(&self.state),
        })
    }

    /// Number of currently admitted merges.
    pub fn running(&self) -> usize {
        self.lock().running
    }

    pub fn is_merging(&self, group_id: &str) -> bool {
        self.lock().groups.contains(group_id)
    }

    fn lock(&self) -> MutexGuard<'_, AdmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reservation of an admitted merge; dropping it frees the slot.
#[derive(Debug)]
pub struct MergeTicket {
    group_id: String,
    state: Arc<Mutex<AdmissionState>>,
}

impl MergeTicket {
    pub fn group_id(&self) -> &str {
        &self.group_id
    }
}

impl Drop for MergeTicket {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.running = state.running.saturating_sub(1);
        state.groups.remove(&self.group_id);
    }
}
