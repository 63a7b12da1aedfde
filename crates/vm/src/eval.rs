//! Evaluation of operations, addressing modes and conditions.
//!
//! All three are pure functions of their register arguments, the stack
//! pointer and the global environment. `None` means the operator is not
//! defined for these arguments, including a wrong argument count.

use crate::genv::Genv;
use mach_common::{Addressing, Condition, Operation, Value};

pub fn eval_condition(cond: &Condition, args: &[Value]) -> Option<bool> {
    match (cond, args) {
        (Condition::Comp(c), [a, b]) => a.cmp(*c, *b),
        (Condition::CompU(c), [a, b]) => a.cmpu(*c, *b),
        (Condition::CompImm(c, n), [a]) => a.cmp(*c, Value::Int(*n)),
        (Condition::CompUImm(c, n), [a]) => a.cmpu(*c, Value::Int(*n)),
        (Condition::CompF(c), [a, b]) => a.cmpf(*c, *b),
        (Condition::NotCompF(c), [a, b]) => a.cmpf(*c, *b).map(|r| !r),
        _ => None,
    }
}

pub fn eval_operation(genv: &Genv, op: &Operation, sp: Value, args: &[Value]) -> Option<Value> {
    use Operation as O;
    match (op, args) {
        (O::Move, [v]) => Some(*v),
        (O::IntConst(n), []) => Some(Value::Int(*n)),
        (O::FloatConst(x), []) => Some(Value::Float(*x)),
        (O::AddrSymbol(s, ofs), []) => genv.symbol_address(s, *ofs),
        (O::AddrStack(ofs), []) => sp.add(Value::Int(*ofs)),
        (O::Cast8Signed, [v]) => v.cast8signed(),
        (O::Cast8Unsigned, [v]) => v.cast8unsigned(),
        (O::Cast16Signed, [v]) => v.cast16signed(),
        (O::Cast16Unsigned, [v]) => v.cast16unsigned(),
        (O::Add, [a, b]) => a.add(*b),
        (O::AddImm(n), [a]) => a.add(Value::Int(*n)),
        (O::Sub, [a, b]) => a.sub(*b),
        (O::RsubImm(n), [a]) => Value::Int(*n).sub(*a),
        (O::Mul, [a, b]) => a.mul(*b),
        (O::MulImm(n), [a]) => a.mul(Value::Int(*n)),
        (O::Divs, [a, b]) => a.divs(*b),
        (O::Divu, [a, b]) => a.divu(*b),
        (O::Mods, [a, b]) => a.mods(*b),
        (O::Modu, [a, b]) => a.modu(*b),
        (O::And, [a, b]) => a.and(*b),
        (O::AndImm(n), [a]) => a.and(Value::Int(*n)),
        (O::Or, [a, b]) => a.or(*b),
        (O::OrImm(n), [a]) => a.or(Value::Int(*n)),
        (O::Xor, [a, b]) => a.xor(*b),
        (O::XorImm(n), [a]) => a.xor(Value::Int(*n)),
        (O::Shl, [a, b]) => a.shl(*b),
        (O::ShlImm(n), [a]) => a.shl(Value::Int(*n)),
        (O::Shr, [a, b]) => a.shr(*b),
        (O::ShrImm(n), [a]) => a.shr(Value::Int(*n)),
        (O::Shru, [a, b]) => a.shru(*b),
        (O::ShruImm(n), [a]) => a.shru(Value::Int(*n)),
        (O::Neg, [a]) => a.neg(),
        (O::Not, [a]) => a.not(),
        (O::NegF, [a]) => a.negf(),
        (O::AbsF, [a]) => a.absf(),
        (O::AddF, [a, b]) => a.addf(*b),
        (O::SubF, [a, b]) => a.subf(*b),
        (O::MulF, [a, b]) => a.mulf(*b),
        (O::DivF, [a, b]) => a.divf(*b),
        (O::SingleOfFloat, [a]) => a.singleoffloat(),
        (O::IntOfFloat, [a]) => a.intoffloat(),
        (O::FloatOfInt, [a]) => a.floatofint(),
        (O::FloatOfIntU, [a]) => a.floatofintu(),
        (O::Cmp(c), args) => eval_condition(c, args).map(|b| Value::Int(b as i32)),
        _ => None,
    }
}

pub fn eval_addressing(genv: &Genv, addr: &Addressing, sp: Value, args: &[Value]) -> Option<Value> {
    match (addr, args) {
        (Addressing::Indexed(n), [a]) => a.add(Value::Int(*n)),
        (Addressing::Indexed2, [a, b]) => a.add(*b),
        (Addressing::Global(s, n), []) => genv.symbol_address(s, *n),
        (Addressing::Based(s, n), [a]) => genv.symbol_address(s, *n)?.add(*a),
        (Addressing::Stack(n), []) => sp.add(Value::Int(*n)),
        _ => None,
    }
}
