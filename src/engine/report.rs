// src/engine/report.rs

//! Text rendering of listings and run results.

use crate::config::Manifest;
use crate::engine::ProgramResult;

/// Lines for `list`: the name, or with `verbose` the name, resolved path
/// and arguments.
pub fn list_lines(manifest: &Manifest, names: &[&str], verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for name in names {
        let Some(program) = manifest.program.get(*name) else {
            continue;
        };
        if !verbose {
            lines.push(name.to_string());
            continue;
        }
        lines.push(format!(
            "{name} ({})",
            manifest.program_path(program).display()
        ));
        if !program.args.is_empty() {
            lines.push(format!("    args = {}", program.args.join(" ")));
        }
    }
    lines
}

/// One line per result, sorted by program name, then a summary line.
pub fn result_lines(results: &[ProgramResult]) -> Vec<String> {
    let mut sorted: Vec<&ProgramResult> = results.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut lines: Vec<String> = sorted
        .iter()
        .map(|r| format!("{}  ->  {}", r.name, r.verdict))
        .collect();

    let passed = results.iter().filter(|r| r.verdict.is_pass()).count();
    lines.push(String::new());
    lines.push(format!(
        "{passed}/{} programs passed ({} not passed)",
        results.len(),
        results.len() - passed
    ));
    lines
}

/// Warning lines for filters that matched nothing.
pub fn unused_filter_lines(unused: &[&str]) -> Vec<String> {
    unused
        .iter()
        .map(|f| format!("No program matched filter '{f}'"))
        .collect()
}
