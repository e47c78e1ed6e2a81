//! # External Command Execution
//!
//! Metadata is built by `createrepo` and merged by `mergerepo`; both are
//! external tools. This module keeps their invocation behind the
//! [`CommandExecutor`] trait so jobs can be exercised without the tools
//! installed, and keeps argument assembly in pure functions
//! ([`merge_command`], [`createrepo_command`]) that can be tested on their own.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use url::Url;

use crate::error::{Error, Result};

/// Tool that merges several yum repositories into one metadata tree.
pub const MERGE_TOOL: &str = "mergerepo";

/// Tool that builds the metadata tree of a single repository.
pub const CREATEREPO_TOOL: &str = "createrepo";

/// A program and its arguments, kept apart so no shell quoting is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Arguments that start with `prefix`, with the prefix stripped.
    pub fn args_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.args.iter().filter_map(move |a| a.strip_prefix(prefix))
    }

    /// The argument following `flag`, if present.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands synchronously.
pub trait CommandExecutor: Send + Sync {
    /// Runs `command` to completion.
    ///
    /// A command that cannot be started or exits unsuccessfully is an error.
    fn run(&self, command: &CommandLine) -> Result<CommandOutput>;
}

/// Executes commands as child processes of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, command: &CommandLine) -> Result<CommandOutput> {
        log::debug!("Executing: {}", command);

        let output = Command::new(&command.program)
            .args(&command.args)
            .output()
            .map_err(|e| Error::Command {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !output.status.success() {
            return Err(Error::Command {
                command: command.to_string(),
                message: format!("{} {}", output.status, result.stderr.trim()),
            });
        }

        Ok(result)
    }
}

/// Makes `path` absolute against the current directory.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

/// `file:` URI of a directory, with the trailing slash `mergerepo` expects.
pub fn directory_uri(dir: &Path) -> Result<String> {
    let dir = absolute_path(dir)?;
    Url::from_directory_path(&dir)
        .map(|url| url.to_string())
        .map_err(|_| Error::Path {
            message: format!("cannot express '{}' as a file URI", dir.display()),
        })
}

/// Builds the `mergerepo` invocation merging `member_base_dirs` into
/// `group_base_dir`.
///
/// Group file generation is always disabled (`--nogroups`), and `-d`
/// requests database generation for the merged tree.
pub fn merge_command(group_base_dir: &Path, member_base_dirs: &[PathBuf]) -> Result<CommandLine> {
    let mut command = CommandLine::new(MERGE_TOOL).arg("--nogroups").arg("-d");
    for member in member_base_dirs {
        command = command.arg(format!("--repo={}", directory_uri(member)?));
    }
    let output = absolute_path(group_base_dir)?;
    Ok(command.arg("-o").arg(output.display().to_string()))
}

/// Builds the `createrepo` invocation for one repository.
pub fn createrepo_command(base_dir: &Path, output_dir: &Path) -> Result<CommandLine> {
    Ok(CommandLine::new(CREATEREPO_TOOL)
        .arg("--update")
        .arg("-o")
        .arg(absolute_path(output_dir)?.display().to_string())
        .arg(absolute_path(base_dir)?.display().to_string()))
}
