//! Default values for yum-metadata configuration.
//!
//! This module provides centralized default values used across the library
//! and the commands, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "yum-metadata.yaml";

/// Directory in which `mergerepo` creates its working directories.
pub const MERGE_TEMP_ROOT: &str = "/var/tmp";

/// Default number of metadata jobs running in parallel.
pub const MAX_PARALLEL_THREADS: usize = 10;

/// Returns the default server temp directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/yum-metadata` (XDG Base Directory)
/// - macOS: `~/Library/Caches/yum-metadata`
/// - Windows: `{FOLDERID_LocalAppData}\yum-metadata`
///
/// Falls back to `.yum-metadata-tmp` in the current directory if the
/// platform cache directory cannot be determined.
pub fn default_temp_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".yum-metadata-tmp"))
        .join("yum-metadata")
}
