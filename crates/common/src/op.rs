//! Operators, addressing modes and branch conditions.
//!
//! These are pure descriptions; evaluation against a register file lives in
//! the VM, which knows the stack pointer and the symbol table.

use crate::chunk::Ty;
use crate::error::NameError;
use std::str::FromStr;

/// A binary comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

pub const ALL_COMPARISONS: [Comparison; 6] = [
    Comparison::Eq,
    Comparison::Ne,
    Comparison::Lt,
    Comparison::Le,
    Comparison::Gt,
    Comparison::Ge,
];

impl Comparison {
    pub fn name(self) -> &'static str {
        match self {
            Comparison::Eq => "eq",
            Comparison::Ne => "ne",
            Comparison::Lt => "lt",
            Comparison::Le => "le",
            Comparison::Gt => "gt",
            Comparison::Ge => "ge",
        }
    }

    /// Apply the comparison to two ordered values.
    pub fn holds<T: PartialOrd>(self, a: T, b: T) -> bool {
        match self {
            Comparison::Eq => a == b,
            Comparison::Ne => a != b,
            Comparison::Lt => a < b,
            Comparison::Le => a <= b,
            Comparison::Gt => a > b,
            Comparison::Ge => a >= b,
        }
    }

    /// Result when the operands are known to differ but are not ordered
    /// (pointers into different blocks, a pointer against null).
    pub fn mismatch(self) -> Option<bool> {
        match self {
            Comparison::Eq => Some(false),
            Comparison::Ne => Some(true),
            _ => None,
        }
    }
}

impl FromStr for Comparison {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_COMPARISONS
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| NameError::UnknownComparison(s.to_string()))
    }
}

/// A branch condition over register arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Signed integer comparison of two registers.
    Comp(Comparison),
    /// Unsigned integer comparison of two registers.
    CompU(Comparison),
    /// Signed comparison of a register against an immediate.
    CompImm(Comparison, i32),
    /// Unsigned comparison of a register against an immediate.
    CompUImm(Comparison, i32),
    /// Float comparison.
    CompF(Comparison),
    /// Negated float comparison (true for unordered operands).
    NotCompF(Comparison),
}

impl Condition {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Condition::Comp(_) => "cmp",
            Condition::CompU(_) => "cmpu",
            Condition::CompImm(..) => "cmpimm",
            Condition::CompUImm(..) => "cmpuimm",
            Condition::CompF(_) => "cmpf",
            Condition::NotCompF(_) => "notcmpf",
        }
    }

    /// Number of register arguments.
    pub fn arity(&self) -> usize {
        match self {
            Condition::CompImm(..) | Condition::CompUImm(..) => 1,
            _ => 2,
        }
    }

    /// Type expected of every register argument.
    pub fn arg_ty(&self) -> Ty {
        match self {
            Condition::CompF(_) | Condition::NotCompF(_) => Ty::Float,
            _ => Ty::Int,
        }
    }
}

/// An arithmetic or address-forming operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Move,
    IntConst(i32),
    FloatConst(f64),
    /// Address of a global symbol plus a byte offset.
    AddrSymbol(String, i32),
    /// Stack pointer plus a byte offset.
    AddrStack(i32),
    Cast8Signed,
    Cast8Unsigned,
    Cast16Signed,
    Cast16Unsigned,
    Add,
    AddImm(i32),
    Sub,
    /// Immediate minus register.
    RsubImm(i32),
    Mul,
    MulImm(i32),
    Divs,
    Divu,
    Mods,
    Modu,
    And,
    AndImm(i32),
    Or,
    OrImm(i32),
    Xor,
    XorImm(i32),
    Shl,
    ShlImm(i32),
    Shr,
    ShrImm(i32),
    Shru,
    ShruImm(i32),
    Neg,
    Not,
    NegF,
    AbsF,
    AddF,
    SubF,
    MulF,
    DivF,
    SingleOfFloat,
    IntOfFloat,
    FloatOfInt,
    FloatOfIntU,
    /// Evaluate a condition to 1 or 0.
    Cmp(Condition),
}

impl Operation {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Operation::Move => "move",
            Operation::IntConst(_) => "intconst",
            Operation::FloatConst(_) => "floatconst",
            Operation::AddrSymbol(..) => "addrsymbol",
            Operation::AddrStack(_) => "addrstack",
            Operation::Cast8Signed => "cast8signed",
            Operation::Cast8Unsigned => "cast8unsigned",
            Operation::Cast16Signed => "cast16signed",
            Operation::Cast16Unsigned => "cast16unsigned",
            Operation::Add => "add",
            Operation::AddImm(_) => "addimm",
            Operation::Sub => "sub",
            Operation::RsubImm(_) => "rsubimm",
            Operation::Mul => "mul",
            Operation::MulImm(_) => "mulimm",
            Operation::Divs => "divs",
            Operation::Divu => "divu",
            Operation::Mods => "mods",
            Operation::Modu => "modu",
            Operation::And => "and",
            Operation::AndImm(_) => "andimm",
            Operation::Or => "or",
            Operation::OrImm(_) => "orimm",
            Operation::Xor => "xor",
            Operation::XorImm(_) => "xorimm",
            Operation::Shl => "shl",
            Operation::ShlImm(_) => "shlimm",
            Operation::Shr => "shr",
            Operation::ShrImm(_) => "shrimm",
            Operation::Shru => "shru",
            Operation::ShruImm(_) => "shruimm",
            Operation::Neg => "neg",
            Operation::Not => "not",
            Operation::NegF => "negf",
            Operation::AbsF => "absf",
            Operation::AddF => "addf",
            Operation::SubF => "subf",
            Operation::MulF => "mulf",
            Operation::DivF => "divf",
            Operation::SingleOfFloat => "singleoffloat",
            Operation::IntOfFloat => "intoffloat",
            Operation::FloatOfInt => "floatofint",
            Operation::FloatOfIntU => "floatofintu",
            Operation::Cmp(_) => "cmp",
        }
    }

    /// Number of register arguments.
    pub fn arity(&self) -> usize {
        match self {
            Operation::IntConst(_)
            | Operation::FloatConst(_)
            | Operation::AddrSymbol(..)
            | Operation::AddrStack(_) => 0,
            Operation::Add
            | Operation::Sub
            | Operation::Mul
            | Operation::Divs
            | Operation::Divu
            | Operation::Mods
            | Operation::Modu
            | Operation::And
            | Operation::Or
            | Operation::Xor
            | Operation::Shl
            | Operation::Shr
            | Operation::Shru
            | Operation::AddF
            | Operation::SubF
            | Operation::MulF
            | Operation::DivF => 2,
            Operation::Cmp(c) => c.arity(),
            _ => 1,
        }
    }

    /// Type of the result, or `None` for `Move`, which preserves its argument.
    pub fn result_ty(&self) -> Option<Ty> {
        match self {
            Operation::Move => None,
            Operation::FloatConst(_)
            | Operation::NegF
            | Operation::AbsF
            | Operation::AddF
            | Operation::SubF
            | Operation::MulF
            | Operation::DivF
            | Operation::SingleOfFloat
            | Operation::FloatOfInt
            | Operation::FloatOfIntU => Some(Ty::Float),
            _ => Some(Ty::Int),
        }
    }

    /// Global symbol this operation refers to, if any.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Operation::AddrSymbol(s, _) => Some(s),
            _ => None,
        }
    }
}

/// How a memory access computes its address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addressing {
    /// Register plus byte offset.
    Indexed(i32),
    /// Sum of two registers.
    Indexed2,
    /// Symbol address plus byte offset.
    Global(String, i32),
    /// Symbol address plus byte offset plus register.
    Based(String, i32),
    /// Stack pointer plus byte offset.
    Stack(i32),
}

impl Addressing {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Addressing::Indexed(_) => "indexed",
            Addressing::Indexed2 => "indexed2",
            Addressing::Global(..) => "global",
            Addressing::Based(..) => "based",
            Addressing::Stack(_) => "stack",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Addressing::Indexed(_) | Addressing::Based(..) => 1,
            Addressing::Indexed2 => 2,
            Addressing::Global(..) | Addressing::Stack(_) => 0,
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            Addressing::Global(s, _) | Addressing::Based(s, _) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_holds() {
        assert!(Comparison::Le.holds(3, 3));
        assert!(!Comparison::Gt.holds(3, 3));
        assert!(Comparison::Ne.holds(1.0, 2.0));
    }

    #[test]
    fn comparison_mismatch() {
        assert_eq!(Comparison::Eq.mismatch(), Some(false));
        assert_eq!(Comparison::Ne.mismatch(), Some(true));
        assert_eq!(Comparison::Lt.mismatch(), None);
    }

    #[test]
    fn comparison_names_parse() {
        for c in ALL_COMPARISONS {
            assert_eq!(c.name().parse::<Comparison>(), Ok(c));
        }
        assert!("lte".parse::<Comparison>().is_err());
    }

    #[test]
    fn arities() {
        assert_eq!(Operation::IntConst(1).arity(), 0);
        assert_eq!(Operation::AddImm(1).arity(), 1);
        assert_eq!(Operation::Add.arity(), 2);
        assert_eq!(
            Operation::Cmp(Condition::CompImm(Comparison::Lt, 0)).arity(),
            1
        );
        assert_eq!(Addressing::Indexed2.arity(), 2);
        assert_eq!(Addressing::Stack(0).arity(), 0);
    }

    #[test]
    fn result_types() {
        assert_eq!(Operation::AddF.result_ty(), Some(Ty::Float));
        assert_eq!(Operation::IntOfFloat.result_ty(), Some(Ty::Int));
        assert_eq!(
            Operation::Cmp(Condition::CompF(Comparison::Eq)).result_ty(),
            Some(Ty::Int)
        );
        assert_eq!(Operation::Move.result_ty(), None);
    }

    #[test]
    fn symbols() {
        assert_eq!(
            Operation::AddrSymbol("g".to_string(), 0).symbol(),
            Some("g")
        );
        assert_eq!(Addressing::Based("t".to_string(), 4).symbol(), Some("t"));
        assert_eq!(Addressing::Indexed(4).symbol(), None);
    }
}
