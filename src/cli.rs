// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::default_manifest_path;

/// Command-line arguments for `testexec`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "testexec",
    version,
    about = "Run test programs in isolated child processes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the manifest (TOML).
    ///
    /// Default: `Testexec.toml` in the current working directory.
    #[arg(
        long,
        value_name = "PATH",
        default_value_os_t = default_manifest_path(),
        global = true
    )]
    pub manifest: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TESTEXEC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List test programs and their metadata.
    List {
        /// Show the resolved path and arguments of each program.
        #[arg(short, long)]
        verbose: bool,

        /// Glob patterns selecting programs by name.
        filters: Vec<String>,
    },
    /// Run test programs and report their results.
    Run {
        /// Glob patterns selecting programs by name.
        filters: Vec<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
