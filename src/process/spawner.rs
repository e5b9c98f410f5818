// src/process/spawner.rs

//! Spawn factories.
//!
//! A `Spawner` never duplicates the calling process. It launches the
//! `testexec-child` bootstrap with the body and output mode encoded on its
//! command line, records the new pid in the global [`Reaper`], and returns
//! at once. Everything that can go wrong after that point happens inside
//! the child and shows up only in its [`Status`](super::Status) and
//! captured stderr.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use nix::unistd::Pid;
use tracing::debug;

use crate::errors::{Result, TestexecError};
use crate::process::body::{bootstrap_args, Body, Output};
use crate::process::handle::ProcessHandle;
use crate::process::reaper::{Reaper, TrackedChild};

/// File name of the bootstrap binary.
pub const BOOTSTRAP_NAME: &str = "testexec-child";

/// Environment variable that overrides where the bootstrap is found.
pub const BOOTSTRAP_ENV: &str = "TESTEXEC_CHILD";

#[derive(Debug, Clone)]
pub struct Spawner {
    bootstrap: PathBuf,
}

impl Spawner {
    /// Use the bootstrap found by [`locate_bootstrap`].
    pub fn new() -> Result<Self> {
        Ok(Self::with_bootstrap(locate_bootstrap()?))
    }

    /// Use an explicit bootstrap binary.
    pub fn with_bootstrap(bootstrap: impl Into<PathBuf>) -> Self {
        Self {
            bootstrap: bootstrap.into(),
        }
    }

    pub fn bootstrap(&self) -> &Path {
        &self.bootstrap
    }

    /// Spawn `body` with the parent's stdout and stderr.
    pub fn fork_capture(&self, body: impl Into<Body>) -> Result<ProcessHandle> {
        self.spawn(body.into(), Output::Inherit)
    }

    /// Spawn `body` with stdout and stderr written to the given files.
    ///
    /// The files are created (or truncated) by the child before the body
    /// runs. If either cannot be opened the child aborts without running
    /// the body.
    pub fn fork_files(
        &self,
        body: impl Into<Body>,
        stdout: impl Into<PathBuf>,
        stderr: impl Into<PathBuf>,
    ) -> Result<ProcessHandle> {
        let output = Output::Files {
            stdout: stdout.into(),
            stderr: stderr.into(),
        };
        self.spawn(body.into(), output)
    }

    pub fn spawn(&self, body: Body, output: Output) -> Result<ProcessHandle> {
        let mut cmd = Command::new(&self.bootstrap);
        cmd.args(bootstrap_args(&body, &output));

        let description = describe(&body);
        let reaper = Reaper::global();

        // Spawn and insert under one lock so a concurrent wait_any that
        // reaps this pid always finds it in the table.
        let mut table = reaper.lock();
        let child = cmd.spawn().map_err(|source| TestexecError::Spawn {
            program: self.bootstrap.clone(),
            source,
        })?;
        let pid = Pid::from_raw(child.id() as i32);
        // Dropping a std Child neither kills nor waits; the reaper owns it.
        drop(child);

        table.insert(
            pid,
            TrackedChild {
                description: description.clone(),
                stdout_path: output.stdout_path().cloned(),
            },
        );
        drop(table);

        debug!(pid = pid.as_raw(), child = %description, ?output, "spawned child");

        Ok(ProcessHandle::new(
            pid,
            output.stdout_path().cloned(),
            output.stderr_path().cloned(),
        ))
    }
}

fn describe(body: &Body) -> String {
    match body {
        Body::Exec { program, args } => {
            let mut s = program.display().to_string();
            for arg in args {
                s.push(' ');
                s.push_str(arg);
            }
            s
        }
        Body::Entry(entry) => format!("{entry:?}"),
    }
}

/// Find the `testexec-child` bootstrap.
///
/// Order: `$TESTEXEC_CHILD`, then next to the running executable, then one
/// directory up (cargo places test binaries in `target/<profile>/deps`).
pub fn locate_bootstrap() -> Result<PathBuf> {
    if let Some(path) = env::var_os(BOOTSTRAP_ENV) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Ok(path);
        }
        return Err(TestexecError::Bootstrap(format!(
            "{BOOTSTRAP_ENV} points to {}, which is not a file",
            path.display()
        )));
    }

    let exe = env::current_exe()?;
    let candidates = exe
        .parent()
        .into_iter()
        .flat_map(|dir| [Some(dir), dir.parent()])
        .flatten()
        .map(|dir| dir.join(BOOTSTRAP_NAME));

    for candidate in candidates {
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(TestexecError::Bootstrap(format!(
        "{BOOTSTRAP_NAME} not found near {}; set {BOOTSTRAP_ENV}",
        exe.display()
    )))
}
