// tests/process_wait_any.rs

use std::collections::{BTreeSet, HashMap, HashSet};
use std::thread;
use std::time::Duration;

use nix::errno::Errno;
use testexec::errors::TestexecError;
use testexec::process::{wait_any, ChildEntry, Reaper, Status};
use testexec_test_utils::{capture_logs, grep_string, init_tracing, reaper_guard, spawner};

const CHILD: &str = env!("CARGO_BIN_EXE_testexec-child");

#[test]
fn wait_any_one() {
    init_tracing();
    let _guard = reaper_guard();

    let child = spawner(CHILD).fork_capture(ChildEntry::Exit(15)).unwrap();
    let pid = child.pid();

    let (reaped, status) = wait_any().unwrap();
    assert_eq!(reaped, pid);
    assert!(status.exited());
    assert_eq!(status.exit_status(), Some(15));
    assert!(!Reaper::global().is_tracked(pid));
}

#[test]
fn wait_any_many_returns_each_code_once() {
    init_tracing();
    let _guard = reaper_guard();
    let spawner = spawner(CHILD);

    let mut pids = HashSet::new();
    for code in [15, 30, 45] {
        let child = spawner.fork_capture(ChildEntry::Exit(code)).unwrap();
        pids.insert(child.pid());
    }

    let mut codes = BTreeSet::new();
    let mut reaped = HashSet::new();
    for _ in 0..3 {
        let (pid, status) = wait_any().unwrap();
        assert!(status.exited());
        assert!(reaped.insert(pid), "pid {pid} returned twice");
        codes.insert(status.exit_status().unwrap());
    }

    assert_eq!(codes, BTreeSet::from([15, 30, 45]));
    assert_eq!(reaped, pids);
    assert!(Reaper::global().is_empty());
}

#[test]
fn wait_any_none_is_failure() {
    init_tracing();
    let _guard = reaper_guard();

    match wait_any() {
        Err(e) => {
            assert!(e.is_no_children());
            assert!(grep_string("Failed to wait", &e.to_string()));
            assert_eq!(e.original_errno(), Some(Errno::ECHILD));
        }
        Ok((pid, status)) => panic!("expected an error, got {pid}: {status}"),
    }
}

#[test]
fn wait_any_after_everything_is_reaped_fails() {
    init_tracing();
    let _guard = reaper_guard();

    let child = spawner(CHILD).fork_capture(ChildEntry::Exit(0)).unwrap();
    assert_eq!(child.wait().unwrap(), Status::Exited(0));

    let err = wait_any().unwrap_err();
    assert!(matches!(
        err,
        TestexecError::NoChildren {
            errno: Errno::ECHILD
        }
    ));
}

#[test]
fn handle_is_invalid_after_wait_any() {
    init_tracing();
    let _guard = reaper_guard();

    let child = spawner(CHILD).fork_capture(ChildEntry::Exit(3)).unwrap();
    let (pid, _) = wait_any().unwrap();
    assert_eq!(pid, child.pid());

    let err = child.wait().unwrap_err();
    assert!(matches!(err, TestexecError::NotTracked(p) if p == pid));
}

#[test]
fn slow_and_fast_children_mix_with_signals() {
    init_tracing();
    let _guard = reaper_guard();
    let spawner = spawner(CHILD);

    let slow = spawner
        .fork_capture(ChildEntry::Sleep {
            millis: 300,
            code: 9,
        })
        .unwrap();
    let aborting = spawner.fork_capture(ChildEntry::Abort).unwrap();
    assert_eq!(Reaper::global().len(), 2);

    let mut by_pid = HashMap::new();
    for _ in 0..2 {
        let (pid, status) = wait_any().unwrap();
        by_pid.insert(pid, status);
    }

    assert_eq!(by_pid[&slow.pid()], Status::Exited(9));
    assert_eq!(
        by_pid[&aborting.pid()].term_sig(),
        Some(nix::sys::signal::Signal::SIGABRT as i32)
    );
}

#[test]
fn direct_wait_and_wait_any_split_the_children() {
    init_tracing();
    let _guard = reaper_guard();
    let spawner = spawner(CHILD);

    let direct = spawner
        .fork_capture(ChildEntry::Sleep {
            millis: 100,
            code: 1,
        })
        .unwrap();
    let other = spawner.fork_capture(ChildEntry::Exit(2)).unwrap();
    let other_pid = other.pid();

    assert_eq!(direct.wait().unwrap(), Status::Exited(1));

    let (pid, status) = wait_any().unwrap();
    assert_eq!(pid, other_pid);
    assert_eq!(status, Status::Exited(2));
    assert!(wait_any().unwrap_err().is_no_children());
}

#[test]
fn spawning_while_another_thread_waits_reaps_each_child_once() {
    init_tracing();
    let _guard = reaper_guard();
    const CHILDREN: i32 = 16;

    let waiter = thread::spawn(|| {
        capture_logs(|| {
            let mut reaped = Vec::new();
            while reaped.len() < CHILDREN as usize {
                match wait_any() {
                    Ok(done) => reaped.push(done),
                    // The spawning thread has not started anything yet.
                    Err(e) if e.is_no_children() => thread::sleep(Duration::from_millis(1)),
                    Err(e) => panic!("wait_any failed: {e}"),
                }
            }
            reaped
        })
    });

    let spawner = spawner(CHILD);
    let mut spawned = HashMap::new();
    for code in 0..CHILDREN {
        let child = spawner.fork_capture(ChildEntry::Exit(code)).unwrap();
        spawned.insert(child.pid(), code);
    }

    let (reaped, logs) = waiter.join().unwrap();

    let mut seen = HashSet::new();
    for (pid, status) in &reaped {
        assert!(seen.insert(*pid), "pid {pid} returned twice");
        assert_eq!(*status, Status::Exited(spawned[pid]));
    }
    assert_eq!(seen.len(), spawned.len());
    assert!(!logs.contains("not spawned by testexec"), "logs: {logs}");
    assert!(Reaper::global().is_empty());
}
