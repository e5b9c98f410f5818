// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use nix::errno::Errno;
use nix::unistd::Pid;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestexecError {
    /// The OS refused to start the child bootstrap; no child exists.
    #[error("Failed to spawn child via {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot locate child bootstrap: {0}")]
    Bootstrap(String),

    /// Wait-for-any was called with nothing left to reap.
    #[error("Failed to wait for any child process: {errno}")]
    NoChildren { errno: Errno },

    #[error("Failed to wait for {}: {errno}", describe_pid(.pid))]
    Wait { pid: Option<Pid>, errno: Errno },

    #[error("Process {0} is not tracked; it was already reaped")]
    NotTracked(Pid),

    #[error("Unexpected wait status: {0}")]
    UnexpectedWaitStatus(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TestexecError {
    /// The errno reported by the OS, for errors that originate in a syscall.
    pub fn original_errno(&self) -> Option<Errno> {
        match self {
            TestexecError::NoChildren { errno } | TestexecError::Wait { errno, .. } => Some(*errno),
            TestexecError::Spawn { source, .. } => source.raw_os_error().map(Errno::from_raw),
            _ => None,
        }
    }

    /// True when a wait failed only because there was nothing to wait for.
    pub fn is_no_children(&self) -> bool {
        matches!(self, TestexecError::NoChildren { .. })
    }
}

fn describe_pid(pid: &Option<Pid>) -> String {
    match pid {
        Some(pid) => format!("process {pid}"),
        None => "any child process".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TestexecError>;
