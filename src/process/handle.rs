// src/process/handle.rs

use std::path::{Path, PathBuf};

use nix::unistd::Pid;

use crate::errors::Result;
use crate::process::reaper::Reaper;
use crate::process::status::Status;

/// One live child process spawned by a [`Spawner`](super::Spawner).
///
/// `wait` consumes the handle, so a handle can be waited on at most once.
/// If the child is instead reaped through [`Reaper::wait_any`], the handle
/// must not be waited on afterwards; doing so returns
/// [`TestexecError::NotTracked`](crate::errors::TestexecError::NotTracked).
#[must_use = "a spawned child must be reaped with wait() or Reaper::wait_any()"]
#[derive(Debug)]
pub struct ProcessHandle {
    pid: Pid,
    stdout_path: Option<PathBuf>,
    stderr_path: Option<PathBuf>,
}

impl ProcessHandle {
    pub(crate) fn new(pid: Pid, stdout_path: Option<PathBuf>, stderr_path: Option<PathBuf>) -> Self {
        Self {
            pid,
            stdout_path,
            stderr_path,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// File the child's stdout goes to, or `None` if inherited.
    pub fn stdout_path(&self) -> Option<&Path> {
        self.stdout_path.as_deref()
    }

    /// File the child's stderr goes to, or `None` if inherited.
    pub fn stderr_path(&self) -> Option<&Path> {
        self.stderr_path.as_deref()
    }

    /// Block until this child terminates and return how it ended.
    pub fn wait(self) -> Result<Status> {
        Reaper::global().wait_pid(self.pid)
    }
}
