// src/process/status.rs

//! Structured termination status of a reaped child.

use std::fmt;

use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

use crate::errors::{Result, TestexecError};

/// How a child process terminated.
///
/// A process ends through exactly one of these paths. Values are only ever
/// built by translating what the OS reported from a wait call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The process called `exit` with this code.
    Exited(i32),
    /// The process was terminated by a signal.
    Signaled { signal: i32, core_dumped: bool },
}

impl Status {
    /// Translate a raw `WaitStatus` into a pid plus `Status`.
    ///
    /// Stop/continue notifications are never requested by this crate, so
    /// seeing one is an error rather than a status.
    pub(crate) fn from_wait_status(ws: WaitStatus) -> Result<(Pid, Status)> {
        match ws {
            WaitStatus::Exited(pid, code) => Ok((pid, Status::Exited(code))),
            WaitStatus::Signaled(pid, signal, core_dumped) => Ok((
                pid,
                Status::Signaled {
                    signal: signal as i32,
                    core_dumped,
                },
            )),
            other => Err(TestexecError::UnexpectedWaitStatus(format!("{other:?}"))),
        }
    }

    pub fn exited(&self) -> bool {
        matches!(self, Status::Exited(_))
    }

    /// Exit code, if the process exited normally.
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            Status::Exited(code) => Some(*code),
            Status::Signaled { .. } => None,
        }
    }

    pub fn signaled(&self) -> bool {
        matches!(self, Status::Signaled { .. })
    }

    /// Number of the signal that terminated the process.
    pub fn term_sig(&self) -> Option<i32> {
        match self {
            Status::Signaled { signal, .. } => Some(*signal),
            Status::Exited(_) => None,
        }
    }

    /// Terminating signal as a `nix` signal, when it is one nix knows about.
    pub fn signal(&self) -> Option<Signal> {
        self.term_sig().and_then(|n| Signal::try_from(n).ok())
    }

    pub fn core_dumped(&self) -> Option<bool> {
        match self {
            Status::Signaled { core_dumped, .. } => Some(*core_dumped),
            Status::Exited(_) => None,
        }
    }

    /// True only for `Exited(0)`.
    pub fn success(&self) -> bool {
        matches!(self, Status::Exited(0))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Exited(code) => write!(f, "exited with code {code}"),
            Status::Signaled {
                signal,
                core_dumped,
            } => {
                match Signal::try_from(*signal) {
                    Ok(sig) => write!(f, "received signal {signal} ({sig})")?,
                    Err(_) => write!(f, "received signal {signal}")?,
                }
                if *core_dumped {
                    write!(f, " (core dumped)")?;
                }
                Ok(())
            }
        }
    }
}
