// src/process/mod.rs

//! Child process lifecycle.
//!
//! - [`spawner`] holds the spawn factories (`fork_capture`, `fork_files`).
//! - [`body`] describes what a child runs and where its output goes.
//! - [`child`] is the bootstrap that runs inside every child.
//! - [`handle`] is the parent-side handle of one live child.
//! - [`reaper`] is the process-wide table of live children and `wait_any`.
//! - [`status`] translates raw wait results into [`Status`].

pub mod body;
pub mod child;
pub mod handle;
pub mod reaper;
pub mod spawner;
pub mod status;

pub use body::{exec, Body, ChildEntry, Output};
pub use handle::ProcessHandle;
pub use reaper::Reaper;
pub use spawner::{locate_bootstrap, Spawner, BOOTSTRAP_ENV, BOOTSTRAP_NAME};
pub use status::Status;

use nix::unistd::Pid;

use crate::errors::Result;

/// Wait for whichever tracked child terminates first.
///
/// Shorthand for `Reaper::global().wait_any()`.
pub fn wait_any() -> Result<(Pid, Status)> {
    Reaper::global().wait_any()
}
