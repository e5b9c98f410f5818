// src/engine/mod.rs

//! Running manifests of test programs on top of the process core.
//!
//! - [`filters`] selects programs by glob and tracks unused filters.
//! - [`runner`] spawns every selected program and reaps them with
//!   `wait_any`, turning each `Status` into a [`Verdict`].
//! - [`report`] renders listings and results as text.

use std::fmt;
use std::path::PathBuf;

use crate::process::Status;

pub mod filters;
pub mod report;
pub mod runner;

pub use filters::FilterSet;
pub use runner::{classify, run_programs, select_programs};

/// Canonical program name type.
pub type ProgramName = String;

/// Marker the child bootstrap writes when it cannot exec a program.
pub const EXEC_FAILURE_MARKER: &str = "Failed to execute";

/// What a program's termination means for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Exited with code 0.
    Passed,
    /// Ran and exited with a non-zero code.
    Failed(i32),
    /// Could not even be launched.
    Broken,
    /// Ran and was killed by this signal.
    Crashed(i32),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => write!(f, "passed"),
            Verdict::Failed(code) => write!(f, "failed (exit code {code})"),
            Verdict::Broken => write!(f, "broken (could not be executed)"),
            Verdict::Crashed(signal) => write!(f, "crashed (signal {signal})"),
        }
    }
}

/// Result of one program run.
#[derive(Debug, Clone)]
pub struct ProgramResult {
    pub name: ProgramName,
    pub status: Status,
    pub verdict: Verdict,
    pub stdout: PathBuf,
    pub stderr: PathBuf,
}
