//! Error types for the Mach assembler.

use mach_common::NameError;
use thiserror::Error;

/// Errors produced while assembling text into a program.
///
/// Assembly stops at the first error; every variant carries its 1-based line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AsmError {
    /// A line started with something that is neither a directive nor an instruction.
    #[error("line {line}: unknown directive or instruction '{token}'")]
    UnknownMnemonic { line: usize, token: String },

    /// An unrecognized operation name after `op`.
    #[error("line {line}: unknown operation '{token}'")]
    UnknownOperation { line: usize, token: String },

    /// An unrecognized addressing mode in a `load` or `store`.
    #[error("line {line}: unknown addressing mode '{token}'")]
    UnknownAddressing { line: usize, token: String },

    /// An unrecognized condition kind.
    #[error("line {line}: unknown condition '{token}'")]
    UnknownCondition { line: usize, token: String },

    /// An unrecognized initializer in a `var` directive.
    #[error("line {line}: unknown initializer '{token}'")]
    UnknownInit { line: usize, token: String },

    /// A register, type, chunk or comparison name did not parse.
    #[error("line {line}: {source}")]
    BadName { line: usize, source: NameError },

    /// The line ended before a required operand.
    #[error("line {line}: expected {expected}")]
    MissingArgument { line: usize, expected: &'static str },

    /// A numeric literal could not be parsed or is out of range.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },

    /// An instruction appeared outside `func` ... `end`.
    #[error("line {line}: instruction outside of a function")]
    OutsideFunction { line: usize },

    /// A directive appeared before the enclosing function's `end`.
    #[error("line {line}: directive inside function '{name}'")]
    InsideFunction { line: usize, name: String },

    /// The text ended inside a function.
    #[error("line {line}: function '{name}' has no 'end'")]
    UnterminatedFunction { line: usize, name: String },
}
