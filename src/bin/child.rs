// src/bin/child.rs

//! `testexec-child`: the bootstrap every spawned child starts as.

fn main() {
    testexec::process::child::main()
}
