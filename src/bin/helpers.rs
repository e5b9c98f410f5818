// src/bin/helpers.rs

//! `testexec-helpers`: small programs the integration tests exec into.
//!
//! Usage: `testexec-helpers <helper> [args...]`.

use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let Some(helper) = args.get(1) else {
        eprintln!("Must provide a helper name");
        return ExitCode::FAILURE;
    };

    match helper.as_str() {
        "print-args" => {
            for (i, arg) in args.iter().enumerate() {
                println!("argv[{i}] = {arg}");
            }
            ExitCode::SUCCESS
        }
        "exit" => match args.get(2).and_then(|c| c.parse::<u8>().ok()) {
            Some(code) => ExitCode::from(code),
            None => {
                eprintln!("exit: expected a code between 0 and 255");
                ExitCode::FAILURE
            }
        },
        other => {
            eprintln!("Unknown helper {other}");
            ExitCode::FAILURE
        }
    }
}
