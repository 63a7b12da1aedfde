//! CLI command implementations.

use mach_common::{CallingConvention, Program};
use mach_vm::{Execution, Genv, Machine, RunConfig};
use std::fs;

/// Assemble, verify and execute a program, printing events as they happen.
pub fn run(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: mach run <file.mach> [--fuel N] [--int-regs N]");
        return Err(1);
    }

    let input = &args[0];
    let config = parse_run_flags(&args[1..])?;
    let program = read_program(input)?;
    check(&program, &config.convention)?;

    let (genv, mem) = Genv::load(&program).map_err(|e| {
        eprintln!("error: {e}");
        3
    })?;
    let machine = Machine::new(&genv, config.convention);
    let initial = machine.initial_state(&program.entry, mem).map_err(|e| {
        eprintln!("error: {e}");
        3
    })?;

    let mut exec = Execution::new(machine, initial);
    let mut fuel = config.fuel;
    loop {
        match exec.exit_code() {
            Ok(Some(code)) => {
                println!("exit {code}");
                return Ok(());
            }
            Ok(None) => {}
            Err(reason) => return Err(went_wrong(&exec, &reason)),
        }
        if fuel == 0 {
            eprintln!("error: out of fuel after {} steps", exec.steps());
            return Err(4);
        }
        fuel -= 1;
        let reason = match exec.step() {
            Ok(events) => {
                for e in events {
                    println!("{e}");
                }
                continue;
            }
            Err(reason) => reason,
        };
        return Err(went_wrong(&exec, &reason));
    }
}

/// Verify a program and report every error.
pub fn verify(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: verify requires an input file");
        eprintln!("Usage: mach verify <file.mach>");
        return Err(1);
    }

    let input = &args[0];
    let program = read_program(input)?;
    check(&program, &CallingConvention::default())?;
    println!("OK: {input} ({} globals)", program.len());
    Ok(())
}

/// Print the canonical text of a program.
pub fn fmt(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: fmt requires an input file");
        eprintln!("Usage: mach fmt <file.mach>");
        return Err(1);
    }

    let program = read_program(&args[0])?;
    print!("{}", mach_assembler::disassemble(&program));
    Ok(())
}

// --- Helpers ---

/// Read and assemble a text file.
fn read_program(path: &str) -> Result<Program, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    mach_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })
}

fn check(program: &Program, conv: &CallingConvention) -> Result<(), i32> {
    mach_verifier::verify_with(program, conv).map_err(|errors| {
        for e in &errors {
            eprintln!("error: {e}");
        }
        2
    })
}

fn went_wrong(exec: &Execution<'_>, reason: &mach_vm::Stuck) -> i32 {
    eprintln!("error: went wrong after {} steps: {reason}", exec.steps());
    3
}

/// Parse `--fuel N` and `--int-regs N` into a run configuration.
fn parse_run_flags(args: &[String]) -> Result<RunConfig, i32> {
    let mut config = RunConfig::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--fuel" => config.fuel = flag_value(args, i, flag)?,
            "--int-regs" => {
                let n: usize = flag_value(args, i, flag)?;
                let max = CallingConvention::default().int_params.len();
                if n > max {
                    eprintln!("error: --int-regs must be at most {max}");
                    return Err(1);
                }
                config.convention = CallingConvention::with_int_params(n);
            }
            other => {
                eprintln!("error: unknown flag '{other}'");
                return Err(1);
            }
        }
        i += 2;
    }
    Ok(config)
}

/// The number following the flag at `args[i]`.
fn flag_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, i32> {
    let Some(raw) = args.get(i + 1) else {
        eprintln!("error: {flag} requires a value");
        return Err(1);
    };
    raw.parse().map_err(|_| {
        eprintln!("error: invalid value '{raw}' for {flag}");
        1
    })
}
