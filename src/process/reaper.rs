// src/process/reaper.rs

//! Process-wide table of live children and the wait-for-any primitive.
//!
//! The OS reaps children per process, not per object, so there is exactly
//! one `Reaper` (see [`Reaper::global`]). Every child spawned through a
//! [`Spawner`](super::Spawner) is inserted here and stays until it is
//! reaped, either by [`ProcessHandle::wait`](super::ProcessHandle::wait) or
//! by [`Reaper::wait_any`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{LazyLock, Mutex, MutexGuard};

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::errors::{Result, TestexecError};
use crate::process::status::Status;

/// What the reaper remembers about a live child.
#[derive(Debug, Clone)]
pub(crate) struct TrackedChild {
    pub(crate) description: String,
    pub(crate) stdout_path: Option<PathBuf>,
}

static GLOBAL: LazyLock<Reaper> = LazyLock::new(Reaper::new);

#[derive(Debug)]
pub struct Reaper {
    table: Mutex<HashMap<Pid, TrackedChild>>,
}

impl Reaper {
    fn new() -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
        }
    }

    /// The single reaper of this process.
    pub fn global() -> &'static Reaper {
        &GLOBAL
    }

    /// Lock the table. A poisoned lock only means another thread panicked
    /// mid-operation; the map itself is always left consistent.
    pub(crate) fn lock(&self) -> MutexGuard<'_, HashMap<Pid, TrackedChild>> {
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn is_tracked(&self, pid: Pid) -> bool {
        self.lock().contains_key(&pid)
    }

    /// Block until some tracked child terminates; untrack it and return it.
    ///
    /// Fails with [`TestexecError::NoChildren`] (carrying `ECHILD`) when
    /// nothing is tracked. Which child is returned first when several have
    /// finished is unspecified.
    pub fn wait_any(&self) -> Result<(Pid, Status)> {
        loop {
            if self.is_empty() {
                return Err(TestexecError::NoChildren {
                    errno: Errno::ECHILD,
                });
            }

            // The lock is not held here: spawns must not stall behind a
            // blocking wait.
            let ws = match waitpid(None::<Pid>, None) {
                Ok(ws) => ws,
                Err(Errno::EINTR) => continue,
                Err(Errno::ECHILD) => {
                    let stale = {
                        let mut table = self.lock();
                        let n = table.len();
                        table.clear();
                        n
                    };
                    warn!(stale, "no child processes left; dropping stale entries");
                    return Err(TestexecError::NoChildren {
                        errno: Errno::ECHILD,
                    });
                }
                Err(errno) => return Err(TestexecError::Wait { pid: None, errno }),
            };

            let (pid, status) = match ws {
                WaitStatus::Exited(..) | WaitStatus::Signaled(..) => {
                    Status::from_wait_status(ws)?
                }
                other => {
                    debug!(?other, "ignoring non-terminal wait status");
                    continue;
                }
            };

            match self.lock().remove(&pid) {
                Some(child) => {
                    debug!(
                        pid = pid.as_raw(),
                        child = %child.description,
                        %status,
                        "reaped child"
                    );
                    return Ok((pid, status));
                }
                None => {
                    warn!(
                        pid = pid.as_raw(),
                        %status,
                        "reaped a child not spawned by testexec; ignoring"
                    );
                }
            }
        }
    }

    /// Wait for one specific tracked child.
    pub(crate) fn wait_pid(&self, pid: Pid) -> Result<Status> {
        if !self.is_tracked(pid) {
            return Err(TestexecError::NotTracked(pid));
        }

        let ws = loop {
            match waitpid(pid, None) {
                Ok(ws @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => break ws,
                Ok(_) | Err(Errno::EINTR) => continue,
                Err(errno) => {
                    if errno == Errno::ECHILD {
                        self.lock().remove(&pid);
                    }
                    return Err(TestexecError::Wait {
                        pid: Some(pid),
                        errno,
                    });
                }
            }
        };

        let (_, status) = Status::from_wait_status(ws)?;
        if let Some(child) = self.lock().remove(&pid) {
            debug!(
                pid = pid.as_raw(),
                child = %child.description,
                stdout = ?child.stdout_path,
                %status,
                "waited for child"
            );
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_private_reaper_reports_echild() {
        let reaper = Reaper::new();
        let err = reaper.wait_any().unwrap_err();
        assert!(err.is_no_children());
        assert_eq!(err.original_errno(), Some(Errno::ECHILD));
    }

    #[test]
    fn untracked_pid_cannot_be_waited() {
        let reaper = Reaper::new();
        let pid = Pid::from_raw(999_999);
        let err = reaper.wait_pid(pid).unwrap_err();
        assert!(matches!(err, TestexecError::NotTracked(p) if p == pid));
    }

    #[test]
    fn tracked_entries_are_counted() {
        let reaper = Reaper::new();
        assert!(reaper.is_empty());
        reaper.lock().insert(
            Pid::from_raw(12345),
            TrackedChild {
                description: "fake".to_string(),
                stdout_path: None,
            },
        );
        assert_eq!(reaper.len(), 1);
        assert!(reaper.is_tracked(Pid::from_raw(12345)));
        reaper.lock().clear();
    }
}
