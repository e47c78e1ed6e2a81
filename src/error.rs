//! # Error Handling
//!
//! This module defines the centralized error type for the `yum-metadata`
//! library. It uses the `thiserror` library to create a single `Error` enum
//! that covers the failure modes of descriptor parsing, repository storage,
//! external command execution, configuration loading and job scheduling.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the library. Each variant carries contextual information
//!   (repository ids, item paths, command lines) to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library.
//!
//! Not every error reaches the caller. The merge coordinator deliberately
//! swallows per-member failures and temp-directory cleanup failures; only
//! infrastructure failures such as a failing merge tool surface as a failed
//! job.

use thiserror::Error;

/// Main error type for yum-metadata operations
#[derive(Error, Debug)]
pub enum Error {
    /// A `repomd.xml` descriptor could not be parsed.
    #[error("Descriptor parsing error: {message}")]
    Descriptor { message: String },

    /// An item was expected in repository storage but is not there.
    #[error("Item not found in repository '{repository}': {path}")]
    ItemNotFound { repository: String, path: String },

    /// A repository storage operation failed.
    #[error("Storage error in repository '{repository}': {message}")]
    Storage { repository: String, message: String },

    /// An external command could not be started or exited unsuccessfully.
    #[error("Command failed: {command} - {message}")]
    Command { command: String, message: String },

    /// An error occurred while parsing the server configuration file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A repository id was looked up but is not configured.
    #[error("Unknown repository: {id}")]
    UnknownRepository { id: String },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// The job scheduler could not accept or run a job.
    #[error("Scheduler error: {message}")]
    Scheduler { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
