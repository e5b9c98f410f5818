// src/process/body.rs

//! What a child runs and where its output goes.
//!
//! Children never run arbitrary closures. A body is either an external
//! program that replaces the child image, or one of a small set of fixed
//! entry points that the `testexec-child` bootstrap knows how to run. Both
//! are plain data so they can travel on the bootstrap's command line.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// A fixed child entry point, selected by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildEntry {
    /// Terminate immediately with this exit code.
    Exit(i32),
    /// Abort (SIGABRT).
    Abort,
    /// Deliver this signal number to itself.
    Signal(i32),
    /// Print one line to stdout and one to stderr, then exit with `code`.
    Write {
        stdout: String,
        stderr: String,
        code: i32,
    },
    /// Sleep for `millis` milliseconds, then exit with `code`.
    Sleep { millis: u64, code: i32 },
}

/// The logic a child process executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Replace the child image with `program`. `argv[0]` is the program
    /// path itself; `args` follow it.
    Exec { program: PathBuf, args: Vec<String> },
    Entry(ChildEntry),
}

/// Shorthand for an exec body.
pub fn exec<P, I, S>(program: P, args: I) -> Body
where
    P: Into<PathBuf>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Body::Exec {
        program: program.into(),
        args: args.into_iter().map(Into::into).collect(),
    }
}

impl From<ChildEntry> for Body {
    fn from(entry: ChildEntry) -> Self {
        Body::Entry(entry)
    }
}

/// Where a child's stdout and stderr go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Output {
    /// Share the parent's streams.
    #[default]
    Inherit,
    /// Truncate and write each stream to its own file.
    Files { stdout: PathBuf, stderr: PathBuf },
}

impl Output {
    pub fn stdout_path(&self) -> Option<&PathBuf> {
        match self {
            Output::Inherit => None,
            Output::Files { stdout, .. } => Some(stdout),
        }
    }

    pub fn stderr_path(&self) -> Option<&PathBuf> {
        match self {
            Output::Inherit => None,
            Output::Files { stderr, .. } => Some(stderr),
        }
    }
}

/// Encode an output mode and body as the bootstrap's command-line arguments.
///
/// The layout is the one `child::ChildArgs` parses. Free-form values are
/// placed after `--`, and redirect paths are joined to their flag, so
/// either may start with a dash.
pub(crate) fn bootstrap_args(body: &Body, output: &Output) -> Vec<OsString> {
    let mut argv: Vec<OsString> = Vec::new();

    if let Output::Files { stdout, stderr } = output {
        argv.push(joined_flag("--stdout=", stdout));
        argv.push(joined_flag("--stderr=", stderr));
    }

    match body {
        Body::Exec { program, args } => {
            argv.push("exec".into());
            argv.push("--".into());
            argv.push(program.into());
            argv.extend(args.iter().map(OsString::from));
        }
        Body::Entry(ChildEntry::Exit(code)) => {
            argv.push("exit".into());
            argv.push(format!("--code={code}").into());
        }
        Body::Entry(ChildEntry::Abort) => argv.push("abort".into()),
        Body::Entry(ChildEntry::Signal(signal)) => {
            argv.push("signal".into());
            argv.push(signal.to_string().into());
        }
        Body::Entry(ChildEntry::Write {
            stdout,
            stderr,
            code,
        }) => {
            argv.push("write".into());
            argv.push(format!("--code={code}").into());
            argv.push("--".into());
            argv.push(stdout.into());
            argv.push(stderr.into());
        }
        Body::Entry(ChildEntry::Sleep { millis, code }) => {
            argv.push("sleep".into());
            argv.push(format!("--code={code}").into());
            argv.push(millis.to_string().into());
        }
    }

    argv
}

fn joined_flag(flag: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(path);
    arg
}
