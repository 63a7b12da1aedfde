//! Verification errors for the Mach verifier.
//!
//! Errors inside a function carry the function name and an instruction
//! index (`at`). The verifier collects ALL errors, not just the first.

use mach_common::{Label, MReg, Ty};
use thiserror::Error;

/// Errors found during static verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    // --- Globals ---
    /// Two globals share a name.
    #[error("symbol '{name}' defined more than once")]
    DuplicateSymbol { name: String },

    /// No global has the entry point's name.
    #[error("entry point '{name}' is not defined")]
    MissingEntry { name: String },

    /// The entry point is a variable or an external function.
    #[error("entry point '{name}' is not an internal function")]
    EntryNotInternal { name: String },

    /// The entry point does not have signature `() -> int`.
    #[error("entry point '{name}' has signature {sig}, expected () -> int")]
    BadEntrySignature { name: String, sig: String },

    /// Code refers to a symbol no global defines.
    #[error("unknown symbol '{name}' in {func} at instruction {at}")]
    UnknownSymbol {
        func: String,
        at: usize,
        name: String,
    },

    /// A direct call names a variable.
    #[error("call to non-function '{name}' in {func} at instruction {at}")]
    CallToVariable {
        func: String,
        at: usize,
        name: String,
    },

    /// An initializer takes the address of an undefined symbol.
    #[error("initializer of '{var}' refers to unknown symbol '{name}'")]
    UnknownInitSymbol { var: String, name: String },

    // --- Frames ---
    /// Frame or stack size is negative or not a multiple of 4.
    #[error("{func}: {what} {size} is negative or not word-aligned")]
    BadSize {
        func: String,
        what: &'static str,
        size: i32,
    },

    /// Frame plus stack size exceeds the limit.
    #[error("{func}: frame of {size} bytes exceeds the limit of {max}")]
    FrameTooLarge { func: String, size: i64, max: i32 },

    /// The link or return-address slot does not fit in the frame.
    #[error("{func}: {what} slot {ofs} lies outside the frame")]
    ReservedSlotOutOfFrame {
        func: String,
        what: &'static str,
        ofs: i32,
    },

    /// The link and return-address slots are the same slot.
    #[error("{func}: link and return-address slots overlap at {ofs}")]
    ReservedSlotsOverlap { func: String, ofs: i32 },

    /// A `getstack` / `setstack` slot does not fit in the frame.
    #[error("{func}: stack slot {ofs} at instruction {at} lies outside the frame")]
    SlotOutOfFrame { func: String, at: usize, ofs: i32 },

    /// The outgoing argument area of a call does not fit in the frame.
    #[error("{func}: call to '{callee}' at instruction {at} needs {words} outgoing words beyond the frame")]
    OutgoingOutOfFrame {
        func: String,
        at: usize,
        callee: String,
        words: i32,
    },

    /// A stack argument of a call would overwrite a reserved slot.
    #[error("{func}: arguments of call to '{callee}' at instruction {at} overwrite the {what} slot {ofs}")]
    OutgoingOverlapsSlot {
        func: String,
        at: usize,
        callee: String,
        what: &'static str,
        ofs: i32,
    },

    /// A tail call whose callee takes arguments on the stack.
    #[error("{func}: tail call to '{callee}' at instruction {at} passes {words} words on the stack")]
    TailCallStackArguments {
        func: String,
        at: usize,
        callee: String,
        words: i32,
    },

    /// A global variable larger than the limit.
    #[error("variable '{name}' of {size} bytes exceeds the limit of {max}")]
    VarTooLarge { name: String, size: i64, max: i32 },

    /// A `getparam` with a negative offset.
    #[error("{func}: parameter slot {ofs} at instruction {at} is negative")]
    NegativeParam { func: String, at: usize, ofs: i32 },

    // --- Code ---
    /// A label defined twice in one function.
    #[error("{func}: label {label} defined again at instruction {at}")]
    DuplicateLabel {
        func: String,
        at: usize,
        label: Label,
    },

    /// A branch to a label the function does not define.
    #[error("{func}: branch to undefined label {label} at instruction {at}")]
    UndefinedLabel {
        func: String,
        at: usize,
        label: Label,
    },

    /// The last instruction can fall through past the end of the code.
    #[error("{func}: control can fall off the end of the function")]
    FallsOffEnd { func: String },

    /// Wrong number of register arguments.
    #[error("{func}: '{what}' at instruction {at} takes {expected} arguments, found {found}")]
    ArityMismatch {
        func: String,
        at: usize,
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A register of the wrong class.
    #[error("{func}: register {reg} at instruction {at} should hold {}", .expected.name())]
    RegisterClass {
        func: String,
        at: usize,
        reg: MReg,
        expected: Ty,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let e = VerifyError::UndefinedLabel {
            func: "main".to_string(),
            at: 3,
            label: 9,
        };
        assert_eq!(
            e.to_string(),
            "main: branch to undefined label 9 at instruction 3"
        );
    }

    #[test]
    fn register_class_names_type() {
        let e = VerifyError::RegisterClass {
            func: "f".to_string(),
            at: 0,
            reg: MReg::r(2),
            expected: Ty::Float,
        };
        assert_eq!(e.to_string(), "f: register r2 at instruction 0 should hold float");
    }
}
