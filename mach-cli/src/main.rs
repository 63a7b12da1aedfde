//! Mach CLI — assemble, verify and run Mach programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/assembly error or bad arguments
//! - 2: Verification failure
//! - 3: The program went wrong
//! - 4: Out of fuel

mod commands;

use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => commands::run(&args[2..]),
        "verify" => commands::verify(&args[2..]),
        "fmt" => commands::fmt(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn print_usage() {
    eprintln!("Usage: mach <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <file.mach> [--fuel N] [--int-regs N]   Assemble, verify and execute");
    eprintln!("  verify <file.mach>                          Check a program without running it");
    eprintln!("  fmt <file.mach>                             Print the canonical text");
}
