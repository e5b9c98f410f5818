// src/process/child.rs

//! The child bootstrap.
//!
//! This is the code that runs inside every spawned child, as the
//! `testexec-child` binary. It only ever does single-purpose work: bind the
//! standard streams, then either replace its own image or run a fixed entry
//! point. Nothing it does can surface as an error in the parent; failures
//! here end the child with SIGABRT and a one-line diagnostic on stderr.

use std::convert::Infallible;
use std::ffi::{CString, OsString};
use std::fs::File;
use std::io::Write;
use std::os::fd::AsRawFd;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use nix::sys::signal::{raise, SigHandler, Signal};
use nix::unistd::{dup2, execv};

/// Command line understood by the bootstrap. Produced by
/// `body::bootstrap_args`.
#[derive(Debug, Parser)]
#[command(name = "testexec-child", disable_help_subcommand = true)]
pub struct ChildArgs {
    /// Redirect stdout to this file (created or truncated).
    #[arg(long, value_name = "PATH", requires = "stderr")]
    pub stdout: Option<PathBuf>,

    /// Redirect stderr to this file (created or truncated).
    #[arg(long, value_name = "PATH", requires = "stdout")]
    pub stderr: Option<PathBuf>,

    #[command(subcommand)]
    pub body: BodyCommand,
}

#[derive(Debug, Subcommand)]
pub enum BodyCommand {
    /// Replace this process with PROGRAM.
    Exec {
        program: PathBuf,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
    Exit {
        #[arg(long, allow_negative_numbers = true)]
        code: i32,
    },
    Abort,
    Signal {
        signal: i32,
    },
    Write {
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        code: i32,
        stdout: String,
        stderr: String,
    },
    Sleep {
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        code: i32,
        millis: u64,
    },
}

/// Entry point of the `testexec-child` binary. Never returns.
pub fn main() -> ! {
    let args = match ChildArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("testexec-child: invalid invocation: {e}");
            std::process::abort();
        }
    };
    run(args)
}

/// Bind the streams and run the body.
pub fn run(args: ChildArgs) -> ! {
    restore_sigpipe();

    if let (Some(stdout), Some(stderr)) = (&args.stdout, &args.stderr) {
        redirect_streams(stdout, stderr);
    }

    match args.body {
        BodyCommand::Exec { program, args } => {
            match exec(&program, &args) {
                Ok(never) => match never {},
                Err(err) => fail(&format!("Failed to execute {}: {}", program.display(), err)),
            }
        }
        BodyCommand::Exit { code } => std::process::exit(code),
        BodyCommand::Abort => std::process::abort(),
        BodyCommand::Signal { signal } => {
            if let Ok(sig) = Signal::try_from(signal) {
                let _ = raise(sig);
            }
            // Still alive: the signal is ignored, caught, or invalid.
            fail(&format!("Signal {signal} did not terminate the process"))
        }
        BodyCommand::Write {
            code,
            stdout,
            stderr,
        } => {
            {
                let mut out = std::io::stdout().lock();
                let _ = writeln!(out, "{stdout}");
                let _ = out.flush();
            }
            eprintln!("{stderr}");
            std::process::exit(code)
        }
        BodyCommand::Sleep { code, millis } => {
            std::thread::sleep(Duration::from_millis(millis));
            std::process::exit(code)
        }
    }
}

/// The Rust runtime starts this binary with SIGPIPE ignored, and an ignored
/// disposition survives `execv`. Children must see the default.
fn restore_sigpipe() {
    // SAFETY: single-threaded at this point, and SIG_DFL installs no handler.
    if let Err(e) = unsafe { nix::sys::signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) } {
        fail(&format!("Failed to restore SIGPIPE: {e}"));
    }
}

/// Open both targets before touching fd 1 or 2, so a diagnostic about a
/// bad target still reaches the original stderr.
fn redirect_streams(stdout: &Path, stderr: &Path) {
    let out = open_target("stdout", stdout);
    let err = open_target("stderr", stderr);

    let _ = std::io::stdout().flush();
    bind("stdout", stdout, &out, 1);
    bind("stderr", stderr, &err, 2);
}

fn open_target(stream: &str, path: &Path) -> File {
    match File::create(path) {
        Ok(file) => file,
        Err(e) => fail(&format!(
            "Failed to redirect {stream} to {}: {e}",
            path.display()
        )),
    }
}

fn bind(stream: &str, path: &Path, file: &File, target: i32) {
    if let Err(e) = dup2(file.as_raw_fd(), target) {
        fail(&format!(
            "Failed to redirect {stream} to {}: {e}",
            path.display()
        ));
    }
}

/// Replace the process image. Only returns on failure.
fn exec(program: &Path, args: &[OsString]) -> nix::Result<Infallible> {
    let path = to_cstring(program.as_os_str().as_bytes())?;
    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push(path.clone());
    for arg in args {
        argv.push(to_cstring(arg.as_bytes())?);
    }
    execv(&path, &argv)
}

fn to_cstring(bytes: &[u8]) -> nix::Result<CString> {
    CString::new(bytes).map_err(|_| nix::errno::Errno::EINVAL)
}

/// Report a machinery failure and abort. Never a clean exit.
fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::abort()
}
