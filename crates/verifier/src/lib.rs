//! Mach verifier — static well-formedness checks for Mach programs.
//!
//! The verifier checks a `Program` BEFORE execution. It collects ALL errors
//! (not just the first) and returns them. A program that passes can still
//! get stuck at run time; the checks rule out mistakes visible in the text.
//!
//! # Usage
//!
//! ```
//! use mach_common::{Function, Instruction, MReg, Operation, Program, Signature};
//! use mach_verifier::verify;
//!
//! let main = Function {
//!     sig: Signature::main(),
//!     code: vec![
//!         Instruction::Op { op: Operation::IntConst(0), args: vec![], dst: MReg::r(0) },
//!         Instruction::Return,
//!     ],
//!     frame_size: 8,
//!     stack_size: 0,
//!     link_ofs: 0,
//!     retaddr_ofs: 1,
//! };
//! assert!(verify(&Program::new().add_function("main", main)).is_ok());
//! ```
//!
//! # Passes
//!
//! 1. **Globals** — unique symbols, entry point, symbol references
//! 2. **Limits** — variable and frame sizes, slot bounds, outgoing arguments
//! 3. **Structural** — labels and function ends
//! 4. **Types** — argument counts and register classes

pub mod error;
pub mod globals;
pub mod limits;
pub mod structural;
pub mod types;

pub use error::VerifyError;
pub use limits::MAX_FRAME_SIZE;

use mach_common::{CallingConvention, Program};

/// Verify a program under the default calling convention.
///
/// Returns `Ok(())` if the program passes all checks, or
/// `Err(Vec<VerifyError>)` with all errors found.
pub fn verify(program: &Program) -> Result<(), Vec<VerifyError>> {
    verify_with(program, &CallingConvention::default())
}

/// Verify a program that will run under `conv`, which decides which call
/// arguments travel on the stack.
pub fn verify_with(program: &Program, conv: &CallingConvention) -> Result<(), Vec<VerifyError>> {
    let mut all_errors = Vec::new();

    all_errors.extend(globals::check_globals(program));
    all_errors.extend(limits::check_limits(program, conv));
    all_errors.extend(structural::check_structural(program));
    all_errors.extend(types::check_types(program));

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(all_errors)
    }
}
