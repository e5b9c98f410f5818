// tests/run_manifest.rs

use std::io::Write;

use nix::sys::signal::Signal;
use tempfile::{NamedTempFile, TempDir};
use testexec::config::load_and_validate;
use testexec::engine::{run_programs, select_programs, FilterSet, Verdict};
use testexec::errors::TestexecError;
use testexec::process::{Reaper, Status};
use testexec_test_utils::builders::{ManifestBuilder, ProgramBuilder};
use testexec_test_utils::{capture_logs, grep_file, init_tracing, reaper_guard, spawner};

const CHILD: &str = env!("CARGO_BIN_EXE_testexec-child");
const HELPERS: &str = env!("CARGO_BIN_EXE_testexec-helpers");

#[test]
fn run_distinguishes_pass_fail_and_broken() {
    init_tracing();
    let _guard = reaper_guard();
    let root = TempDir::new().unwrap();

    let manifest = ManifestBuilder::new()
        .with_root(root.path())
        .with_program(
            "args",
            ProgramBuilder::new(HELPERS).arg("print-args").arg("x").build(),
        )
        .with_program(
            "exit3",
            ProgramBuilder::new(HELPERS).arg("exit").arg("3").build(),
        )
        .with_program("missing", ProgramBuilder::new("bin/not-there").build())
        .build();

    let mut filters = FilterSet::new(Vec::<String>::new()).unwrap();
    let names = select_programs(&manifest, &mut filters);
    assert_eq!(names, vec!["args", "exit3", "missing"]);

    let mut results = run_programs(&manifest, &spawner(CHILD), &names).unwrap();
    results.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].verdict, Verdict::Passed);
    assert!(grep_file(r"^argv\[2\] = x$", &results[0].stdout));

    assert_eq!(results[1].status, Status::Exited(3));
    assert_eq!(results[1].verdict, Verdict::Failed(3));

    assert_eq!(results[2].status.signal(), Some(Signal::SIGABRT));
    assert_eq!(results[2].verdict, Verdict::Broken);
    assert!(grep_file("^Failed to execute .*bin/not-there", &results[2].stderr));

    let work = root.path().join(".testexec");
    assert_eq!(results[1].stdout, work.join("exit3").join("stdout"));
}

#[test]
fn spawn_failure_drains_programs_already_running() {
    init_tracing();
    let _guard = reaper_guard();
    let root = TempDir::new().unwrap();

    let manifest = ManifestBuilder::new()
        .with_root(root.path())
        .with_work_dir("out")
        .with_program(
            "ok",
            ProgramBuilder::new(HELPERS).arg("exit").arg("0").build(),
        )
        .build();

    let (result, logs) =
        capture_logs(|| run_programs(&manifest, &spawner(CHILD), &["ok", "not-in-manifest"]));

    match result {
        Err(TestexecError::ConfigError(msg)) => assert!(msg.contains("not-in-manifest")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(results) => panic!("Expected error, got {} results", results.len()),
    }
    assert!(Reaper::global().is_empty());
    assert!(logs.contains("draining running programs"), "logs: {logs}");
    assert!(logs.contains("program=ok"), "logs: {logs}");
    assert!(!logs.contains("failed to drain"), "logs: {logs}");
    assert!(root.path().join("out").join("ok").join("stdout").exists());
}

#[test]
fn filters_select_a_subset_and_report_unused() {
    let manifest = ManifestBuilder::new()
        .with_program("net_tcp", ProgramBuilder::new("bin/tcp").build())
        .with_program("net_udp", ProgramBuilder::new("bin/udp").build())
        .with_program("fs_read", ProgramBuilder::new("bin/read").build())
        .build();

    let mut filters = FilterSet::new(["net_*", "proc_*"]).unwrap();
    let names = select_programs(&manifest, &mut filters);

    assert_eq!(names, vec!["net_tcp", "net_udp"]);
    assert_eq!(filters.unused(), vec!["proc_*"]);
}

#[test]
fn manifest_loads_relative_to_its_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Testexec.toml");
    std::fs::write(
        &path,
        r#"
[config]
work_dir = "out"

[program.hello]
path = "bin/hello"
args = ["-v"]
"#,
    )
    .unwrap();

    let manifest = load_and_validate(&path).unwrap();
    let hello = &manifest.program["hello"];
    assert_eq!(hello.args, vec!["-v"]);
    assert_eq!(manifest.program_path(hello), dir.path().join("bin/hello"));
    assert_eq!(manifest.work_dir(), dir.path().join("out"));
}

#[test]
fn manifest_without_programs_is_a_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[config]
work_dir = "out"
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(TestexecError::ConfigError(msg)) => assert!(msg.contains("at least one")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_manifest_key_is_a_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[program.a]
path = "bin/a"
timeout = 3
"#
    )
    .unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(TestexecError::TomlError(_))
    ));
}
