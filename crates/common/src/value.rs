//! Machine values and the partial operators over them.
//!
//! Every operator returns `None` when it is not defined for the kinds of
//! its operands (an integer added to a float, a division by zero, a shift
//! by 32 or more). The VM treats `None` as "no transition".

use crate::chunk::Ty;
use crate::op::Comparison;

/// Identity of a memory block. Block 0 is never allocated.
pub type Block = u32;

/// A machine value.
#[derive(Debug, Clone, Copy, Default)]
pub enum Value {
    /// 32-bit integer. Signedness is a property of the operator, not the value.
    Int(i32),
    /// IEEE 754 64-bit float.
    Float(f64),
    /// Pointer: a block and a byte offset within it.
    Ptr { block: Block, offset: i32 },
    /// The undefined value. Registers start out holding it.
    #[default]
    Undef,
}

// Floats compare bitwise so that `Value` is `Eq` and two states built by the
// same transitions compare equal even when a register holds NaN.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (
                Value::Ptr {
                    block: b1,
                    offset: o1,
                },
                Value::Ptr {
                    block: b2,
                    offset: o2,
                },
            ) => b1 == b2 && o1 == o2,
            (Value::Undef, Value::Undef) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Ptr { block, offset } => write!(f, "&{block}+{offset}"),
            Value::Undef => write!(f, "undef"),
        }
    }
}

impl Value {
    /// Parent stack pointer seen by the outermost invocation.
    pub const NULLPTR: Value = Value::Int(0);

    /// Parent return address seen by the outermost invocation.
    pub const ZERO: Value = Value::Int(0);

    /// Pointer to the start of `block`.
    pub fn ptr(block: Block, offset: i32) -> Value {
        Value::Ptr { block, offset }
    }

    /// Whether this value may be stored in a location of type `ty`.
    /// `Undef` fits every type; pointers are integers.
    pub fn has_type(&self, ty: Ty) -> bool {
        matches!(
            (self, ty),
            (Value::Undef, _)
                | (Value::Int(_), Ty::Int)
                | (Value::Ptr { .. }, Ty::Int)
                | (Value::Float(_), Ty::Float)
        )
    }

    // ---- integer arithmetic ----

    pub fn add(self, other: Value) -> Option<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(a.wrapping_add(b))),
            (Value::Ptr { block, offset }, Value::Int(n))
            | (Value::Int(n), Value::Ptr { block, offset }) => Some(Value::Ptr {
                block,
                offset: offset.wrapping_add(n),
            }),
            _ => None,
        }
    }

    pub fn sub(self, other: Value) -> Option<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(a.wrapping_sub(b))),
            (Value::Ptr { block, offset }, Value::Int(n)) => Some(Value::Ptr {
                block,
                offset: offset.wrapping_sub(n),
            }),
            (
                Value::Ptr {
                    block: b1,
                    offset: o1,
                },
                Value::Ptr {
                    block: b2,
                    offset: o2,
                },
            ) if b1 == b2 => Some(Value::Int(o1.wrapping_sub(o2))),
            _ => None,
        }
    }

    pub fn mul(self, other: Value) -> Option<Value> {
        self.int_binop(other, |a, b| Some(a.wrapping_mul(b)))
    }

    /// Signed division. Undefined for a zero divisor and for `MIN / -1`.
    pub fn divs(self, other: Value) -> Option<Value> {
        self.int_binop(other, |a, b| if b == 0 { None } else { a.checked_div(b) })
    }

    pub fn divu(self, other: Value) -> Option<Value> {
        self.int_binop(other, |a, b| {
            (a as u32).checked_div(b as u32).map(|q| q as i32)
        })
    }

    pub fn mods(self, other: Value) -> Option<Value> {
        self.int_binop(other, |a, b| if b == 0 { None } else { a.checked_rem(b) })
    }

    pub fn modu(self, other: Value) -> Option<Value> {
        self.int_binop(other, |a, b| {
            (a as u32).checked_rem(b as u32).map(|r| r as i32)
        })
    }

    pub fn and(self, other: Value) -> Option<Value> {
        self.int_binop(other, |a, b| Some(a & b))
    }

    pub fn or(self, other: Value) -> Option<Value> {
        self.int_binop(other, |a, b| Some(a | b))
    }

    pub fn xor(self, other: Value) -> Option<Value> {
        self.int_binop(other, |a, b| Some(a ^ b))
    }

    /// Shift left. The amount must be in `0..32`.
    pub fn shl(self, other: Value) -> Option<Value> {
        self.int_binop(other, |a, b| shift_amount(b).map(|s| a.wrapping_shl(s)))
    }

    /// Arithmetic shift right.
    pub fn shr(self, other: Value) -> Option<Value> {
        self.int_binop(other, |a, b| shift_amount(b).map(|s| a >> s))
    }

    /// Logical shift right.
    pub fn shru(self, other: Value) -> Option<Value> {
        self.int_binop(other, |a, b| shift_amount(b).map(|s| ((a as u32) >> s) as i32))
    }

    pub fn neg(self) -> Option<Value> {
        self.int_unop(|a| a.wrapping_neg())
    }

    pub fn not(self) -> Option<Value> {
        self.int_unop(|a| !a)
    }

    pub fn cast8signed(self) -> Option<Value> {
        self.int_unop(|a| a as i8 as i32)
    }

    pub fn cast8unsigned(self) -> Option<Value> {
        self.int_unop(|a| a as u8 as i32)
    }

    pub fn cast16signed(self) -> Option<Value> {
        self.int_unop(|a| a as i16 as i32)
    }

    pub fn cast16unsigned(self) -> Option<Value> {
        self.int_unop(|a| a as u16 as i32)
    }

    // ---- float arithmetic ----

    pub fn negf(self) -> Option<Value> {
        self.float_unop(|x| -x)
    }

    pub fn absf(self) -> Option<Value> {
        self.float_unop(f64::abs)
    }

    pub fn addf(self, other: Value) -> Option<Value> {
        self.float_binop(other, |a, b| a + b)
    }

    pub fn subf(self, other: Value) -> Option<Value> {
        self.float_binop(other, |a, b| a - b)
    }

    pub fn mulf(self, other: Value) -> Option<Value> {
        self.float_binop(other, |a, b| a * b)
    }

    pub fn divf(self, other: Value) -> Option<Value> {
        self.float_binop(other, |a, b| a / b)
    }

    /// Round to single precision and widen back.
    pub fn singleoffloat(self) -> Option<Value> {
        self.float_unop(|x| x as f32 as f64)
    }

    /// Truncating conversion. Undefined when the result does not fit in `i32`.
    pub fn intoffloat(self) -> Option<Value> {
        match self {
            Value::Float(x) if x > -2_147_483_649.0 && x < 2_147_483_648.0 => {
                Some(Value::Int(x as i32))
            }
            _ => None,
        }
    }

    pub fn floatofint(self) -> Option<Value> {
        match self {
            Value::Int(n) => Some(Value::Float(n as f64)),
            _ => None,
        }
    }

    pub fn floatofintu(self) -> Option<Value> {
        match self {
            Value::Int(n) => Some(Value::Float(n as u32 as f64)),
            _ => None,
        }
    }

    // ---- comparisons ----

    /// Signed comparison. Pointers compare by offset within one block;
    /// a pointer is never equal to null or to a pointer into another block.
    pub fn cmp(self, c: Comparison, other: Value) -> Option<bool> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(c.holds(a, b)),
            _ => compare_pointers(self, c, other, |a, b| c.holds(a, b)),
        }
    }

    /// Unsigned comparison.
    pub fn cmpu(self, c: Comparison, other: Value) -> Option<bool> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(c.holds(a as u32, b as u32)),
            _ => compare_pointers(self, c, other, |a, b| c.holds(a as u32, b as u32)),
        }
    }

    /// Float comparison. Every ordered comparison involving NaN is false.
    pub fn cmpf(self, c: Comparison, other: Value) -> Option<bool> {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => Some(c.holds(a, b)),
            _ => None,
        }
    }

    fn int_binop(self, other: Value, f: impl FnOnce(i32, i32) -> Option<i32>) -> Option<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => f(a, b).map(Value::Int),
            _ => None,
        }
    }

    fn int_unop(self, f: impl FnOnce(i32) -> i32) -> Option<Value> {
        match self {
            Value::Int(a) => Some(Value::Int(f(a))),
            _ => None,
        }
    }

    fn float_binop(self, other: Value, f: impl FnOnce(f64, f64) -> f64) -> Option<Value> {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => Some(Value::Float(f(a, b))),
            _ => None,
        }
    }

    fn float_unop(self, f: impl FnOnce(f64) -> f64) -> Option<Value> {
        match self {
            Value::Float(a) => Some(Value::Float(f(a))),
            _ => None,
        }
    }
}

fn shift_amount(b: i32) -> Option<u32> {
    let s = b as u32;
    (s < 32).then_some(s)
}

fn compare_pointers(
    lhs: Value,
    c: Comparison,
    rhs: Value,
    same_block: impl FnOnce(i32, i32) -> bool,
) -> Option<bool> {
    match (lhs, rhs) {
        (
            Value::Ptr {
                block: b1,
                offset: o1,
            },
            Value::Ptr {
                block: b2,
                offset: o2,
            },
        ) => {
            if b1 == b2 {
                Some(same_block(o1, o2))
            } else {
                c.mismatch()
            }
        }
        (Value::Ptr { .. }, Value::Int(0)) | (Value::Int(0), Value::Ptr { .. }) => c.mismatch(),
        _ => None,
    }
}
