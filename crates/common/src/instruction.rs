//! Mach instructions.
//!
//! Stack slot offsets (`getstack`, `setstack`, `getparam`) are counted in
//! 4-byte words from the stack pointer; a float slot spans two words.
//! Addressing-mode and `addrstack` offsets are in bytes.

use crate::chunk::{Chunk, Ty};
use crate::op::{Addressing, Condition, Operation};
use crate::reg::MReg;

/// A code label, unique within a function.
pub type Label = u32;

/// The function a call transfers control to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    /// Function pointer held in a register.
    Reg(MReg),
    /// Function named directly.
    Symbol(String),
}

impl std::fmt::Display for Callee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callee::Reg(r) => write!(f, "{r}"),
            Callee::Symbol(s) => write!(f, "{s}"),
        }
    }
}

/// A single Mach instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Branch target. No effect.
    Label(Label),
    /// Load `dst` from the current frame's slot `ofs`.
    GetStack { ofs: i32, ty: Ty, dst: MReg },
    /// Store `src` into the current frame's slot `ofs`.
    SetStack { src: MReg, ofs: i32, ty: Ty },
    /// Load `dst` from slot `ofs` of the caller's frame, found through the link slot.
    GetParam { ofs: i32, ty: Ty, dst: MReg },
    Op {
        op: Operation,
        args: Vec<MReg>,
        dst: MReg,
    },
    Load {
        chunk: Chunk,
        addr: Addressing,
        args: Vec<MReg>,
        dst: MReg,
    },
    Store {
        chunk: Chunk,
        addr: Addressing,
        args: Vec<MReg>,
        src: MReg,
    },
    /// Non-tail call: pushes an activation record.
    Call(Callee),
    /// Tail call: frees the current frame and reuses the caller's record.
    TailCall(Callee),
    Goto(Label),
    /// Branch to `target` when the condition holds, else fall through.
    Cond {
        cond: Condition,
        args: Vec<MReg>,
        target: Label,
    },
    /// Branch to `targets[arg]`.
    JumpTable { arg: MReg, targets: Vec<Label> },
    Return,
}

impl Instruction {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Label(_) => "label",
            Instruction::GetStack { .. } => "getstack",
            Instruction::SetStack { .. } => "setstack",
            Instruction::GetParam { .. } => "getparam",
            Instruction::Op { .. } => "op",
            Instruction::Load { .. } => "load",
            Instruction::Store { .. } => "store",
            Instruction::Call(_) => "call",
            Instruction::TailCall(_) => "tailcall",
            Instruction::Goto(_) => "goto",
            Instruction::Cond { .. } => "cond",
            Instruction::JumpTable { .. } => "jumptable",
            Instruction::Return => "return",
        }
    }

    /// Labels this instruction may branch to.
    pub fn branch_targets(&self) -> Vec<Label> {
        match self {
            Instruction::Goto(l) => vec![*l],
            Instruction::Cond { target, .. } => vec![*target],
            Instruction::JumpTable { targets, .. } => targets.clone(),
            _ => Vec::new(),
        }
    }

    /// Whether control never falls through to the next instruction.
    pub fn ends_block(&self) -> bool {
        matches!(
            self,
            Instruction::Goto(_)
                | Instruction::JumpTable { .. }
                | Instruction::TailCall(_)
                | Instruction::Return
        )
    }
}

/// Position just after `Label(lbl)` in `code`, or `None` if absent.
pub fn find_label(code: &[Instruction], lbl: Label) -> Option<usize> {
    code.iter()
        .position(|i| *i == Instruction::Label(lbl))
        .map(|pos| pos + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_label_returns_position_after_label() {
        let code = vec![
            Instruction::Goto(2),
            Instruction::Label(1),
            Instruction::Return,
            Instruction::Label(2),
            Instruction::Return,
        ];
        assert_eq!(find_label(&code, 1), Some(2));
        assert_eq!(find_label(&code, 2), Some(4));
        assert_eq!(find_label(&code, 3), None);
    }

    #[test]
    fn find_label_takes_first_occurrence() {
        let code = vec![Instruction::Label(7), Instruction::Label(7)];
        assert_eq!(find_label(&code, 7), Some(1));
    }

    #[test]
    fn branch_targets() {
        let jt = Instruction::JumpTable {
            arg: MReg::r(0),
            targets: vec![4, 5],
        };
        assert_eq!(jt.branch_targets(), vec![4, 5]);
        assert!(jt.ends_block());
        assert!(Instruction::Return.ends_block());
        assert!(!Instruction::Call(Callee::Symbol("f".to_string())).ends_block());
        assert!(Instruction::Label(1).branch_targets().is_empty());
    }

    #[test]
    fn callee_display() {
        assert_eq!(Callee::Reg(MReg::r(4)).to_string(), "r4");
        assert_eq!(Callee::Symbol("fib".to_string()).to_string(), "fib");
    }
}
