//! Errors for the Mach VM.
//!
//! [`Stuck`] is the single runtime fault category: it is what
//! [`Machine::step`](crate::Machine::step) returns when no transition
//! applies. It is never recovered from. [`LoadError`] covers problems found
//! while building the global environment, before execution starts.

use mach_common::{Block, Label, Value};
use mach_memory::MemError;
use thiserror::Error;

/// Why a state has no successor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Stuck {
    /// A load, store, allocation bound or free was rejected by memory.
    #[error("memory fault: {0}")]
    Memory(#[from] MemError),

    /// A direct call names a symbol that is not defined.
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),

    /// An indirect call through a value that is not a function pointer.
    #[error("call through non-function value {0}")]
    NotAFunction(Value),

    /// A function identity that resolves to no definition.
    #[error("no function at block {0}")]
    UnknownFunction(Block),

    /// Code-dependent work attempted while the current function is external.
    #[error("function at block {0} is not internal")]
    NotInternal(Block),

    /// The operator is not defined for its operands.
    #[error("operation '{op}' undefined for its operands")]
    UndefinedOperation { op: &'static str },

    /// The addressing mode did not produce an address.
    #[error("addressing mode '{mode}' undefined for its operands")]
    UndefinedAddress { mode: &'static str },

    /// The condition evaluated to neither true nor false.
    #[error("condition '{cond}' undefined for its operands")]
    UndefinedCondition { cond: &'static str },

    /// A branch to a label absent from the current function.
    #[error("label {0} not found")]
    MissingLabel(Label),

    /// A jump table index that is not an in-range integer.
    #[error("jump table index {0} out of range")]
    BadJumpTableIndex(Value),

    /// Control ran past the last instruction of a function.
    #[error("fell off the end of the function")]
    EndOfCode,

    /// The return-address oracle has no address for this call site.
    #[error("no return address for call site")]
    NoReturnAddress,

    /// The frame's link slot does not hold the caller's stack pointer.
    #[error("link slot holds {stored}, expected {expected}")]
    LinkMismatch { stored: Value, expected: Value },

    /// The frame's return-address slot does not hold the caller's return address.
    #[error("return-address slot holds {stored}, expected {expected}")]
    ReturnAddressMismatch { stored: Value, expected: Value },

    /// The external call interface has no outcome for these arguments.
    #[error("external call '{name}' has no outcome")]
    ExternalCallFailed { name: String },

    /// The program already returned from its entry point.
    #[error("program has finished")]
    Finished,

    /// The entry point returned something other than an integer.
    #[error("exit value {0} is not an integer")]
    BadExitValue(Value),
}

/// Errors building the initial global environment and memory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("symbol '{0}' defined more than once")]
    DuplicateSymbol(String),

    #[error("initializer refers to unknown symbol '{0}'")]
    UnknownSymbol(String),

    #[error("entry point '{0}' is not defined")]
    MissingEntry(String),

    #[error("variable '{name}' of {size} bytes exceeds the limit of {max}")]
    VarTooLarge { name: String, size: i64, max: i32 },

    #[error("entry point '{0}' is not a function")]
    EntryNotFunction(String),

    #[error("initializing globals: {0}")]
    Memory(#[from] MemError),
}
