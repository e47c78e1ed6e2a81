//! # Metadata Jobs
//!
//! The two kinds of jobs submitted to the [`crate::scheduler::Scheduler`]:
//!
//! - **`scan`**: rebuilds the metadata of one hosted repository.
//! - **`merge`**: merges the metadata of a group's members into the group.
//!
//! Merge jobs are subject to the admission policy in [`admission`].

pub mod admission;
pub mod merge;
pub mod scan;

pub use admission::{AdmissionDenied, MergeAdmission, MergeTicket, MAXIMAL_PARALLEL_RUNS};
pub use merge::{MergeMetadataTask, MERGE_TASK_ID};
pub use scan::{GenerateParams, ScanTask, SCAN_TASK_ID};
