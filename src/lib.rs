// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod process;

use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::load_and_validate;
use crate::engine::report::{list_lines, result_lines, unused_filter_lines};
use crate::engine::{run_programs, select_programs, FilterSet};
use crate::errors::Result;
use crate::process::Spawner;

/// High-level entry point used by `main.rs`.
///
/// Returns `Ok(true)` when everything selected passed and every filter
/// matched something, `Ok(false)` otherwise.
pub fn run(args: CliArgs) -> Result<bool> {
    let manifest = load_and_validate(&args.manifest)?;
    debug!(
        manifest = %args.manifest.display(),
        programs = manifest.program.len(),
        "manifest loaded"
    );

    match args.command {
        Command::List { verbose, filters } => {
            let mut filters = FilterSet::new(&filters)?;
            let names = select_programs(&manifest, &mut filters);
            for line in list_lines(&manifest, &names, verbose) {
                println!("{line}");
            }
            Ok(report_unused(&filters))
        }
        Command::Run { filters } => {
            let mut filters = FilterSet::new(&filters)?;
            let names = select_programs(&manifest, &mut filters);
            let filters_ok = report_unused(&filters);

            let spawner = Spawner::new()?;
            info!(count = names.len(), bootstrap = %spawner.bootstrap().display(), "running programs");
            let results = run_programs(&manifest, &spawner, &names)?;

            for line in result_lines(&results) {
                println!("{line}");
            }
            let all_passed = results.iter().all(|r| r.verdict.is_pass());
            Ok(filters_ok && all_passed)
        }
    }
}

/// Warn about filters that matched nothing. Returns true if there were none.
fn report_unused(filters: &FilterSet) -> bool {
    let unused = filters.unused();
    for line in unused_filter_lines(&unused) {
        eprintln!("testexec: W: {line}");
    }
    unused.is_empty()
}
