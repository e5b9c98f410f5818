// src/engine/runner.rs

//! Spawn-all, reap-any.
//!
//! Every selected program is started at once through `fork_files`, each
//! with its own `<work_dir>/<name>/{stdout,stderr}`. Completions are then
//! collected with `wait_any` in whatever order the OS reports them. No
//! concurrency limit is applied.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use nix::sys::signal::Signal;
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use crate::config::Manifest;
use crate::engine::{EXEC_FAILURE_MARKER, FilterSet, ProgramName, ProgramResult, Verdict};
use crate::errors::{Result, TestexecError};
use crate::process::{self, Spawner, Status};

/// A spawned program that has not been reaped yet.
struct PendingRun {
    name: ProgramName,
    program: PathBuf,
    stdout: PathBuf,
    stderr: PathBuf,
}

/// Names of the manifest's programs that pass `filters`, in manifest order.
pub fn select_programs<'m>(manifest: &'m Manifest, filters: &mut FilterSet) -> Vec<&'m str> {
    manifest
        .program_names()
        .filter(|name| filters.matches(name))
        .collect()
}

/// Run the named programs and return one result per program, in the order
/// they finished.
pub fn run_programs(
    manifest: &Manifest,
    spawner: &Spawner,
    names: &[&str],
) -> Result<Vec<ProgramResult>> {
    let work_dir = manifest.work_dir();
    let mut pending: HashMap<Pid, PendingRun> = HashMap::new();

    for name in names {
        match spawn_program(manifest, spawner, &work_dir, name) {
            Ok((pid, run)) => {
                pending.insert(pid, run);
            }
            Err(e) => {
                // Never leave already spawned children unreaped.
                warn!(program = %name, error = %e, "failed to spawn; draining running programs");
                if let Err(drain) = reap_all(&mut pending) {
                    warn!(
                        error = %drain,
                        left = pending.len(),
                        "failed to drain running programs"
                    );
                }
                return Err(e);
            }
        }
    }

    reap_all(&mut pending)
}

fn spawn_program(
    manifest: &Manifest,
    spawner: &Spawner,
    work_dir: &Path,
    name: &str,
) -> Result<(Pid, PendingRun)> {
    let program = manifest.program.get(name).ok_or_else(|| {
        TestexecError::ConfigError(format!("unknown program '{name}'"))
    })?;

    let dir = work_dir.join(name);
    fs::create_dir_all(&dir)?;
    let stdout = dir.join("stdout");
    let stderr = dir.join("stderr");

    let path = manifest.program_path(program);
    let handle = spawner.fork_files(
        process::exec(&path, program.args.iter().cloned()),
        &stdout,
        &stderr,
    )?;

    info!(program = %name, pid = handle.pid().as_raw(), path = %path.display(), "started");

    Ok((
        handle.pid(),
        PendingRun {
            name: name.to_string(),
            program: path,
            stdout,
            stderr,
        },
    ))
}

fn reap_all(pending: &mut HashMap<Pid, PendingRun>) -> Result<Vec<ProgramResult>> {
    let mut results = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let (pid, status) = process::wait_any()?;
        let Some(run) = pending.remove(&pid) else {
            debug!(pid = pid.as_raw(), "reaped a child that is not part of this run");
            continue;
        };

        let verdict = classify(status, &run.program, &run.stderr);
        info!(program = %run.name, %status, %verdict, "finished");

        results.push(ProgramResult {
            name: run.name,
            status,
            verdict,
            stdout: run.stdout,
            stderr: run.stderr,
        });
    }

    Ok(results)
}

/// Map a termination status to a verdict.
///
/// SIGABRT together with the bootstrap's exec diagnostic for `program` in
/// the captured stderr means the program never started.
pub fn classify(status: Status, program: &Path, stderr: &Path) -> Verdict {
    match status {
        Status::Exited(0) => Verdict::Passed,
        Status::Exited(code) => Verdict::Failed(code),
        Status::Signaled { signal, .. } => {
            if signal == Signal::SIGABRT as i32 && stderr_has_exec_failure(program, stderr) {
                Verdict::Broken
            } else {
                Verdict::Crashed(signal)
            }
        }
    }
}

fn stderr_has_exec_failure(program: &Path, stderr: &Path) -> bool {
    let prefix = format!("{EXEC_FAILURE_MARKER} {}: ", program.display());
    fs::read_to_string(stderr)
        .map(|s| s.lines().any(|line| line.starts_with(&prefix)))
        .unwrap_or(false)
}
