//! Argument counts and register classes.
//!
//! Integer registers hold integers and pointers; float registers hold
//! floats. Every operand position has a fixed class except `move`, whose
//! argument must match its destination.

use crate::error::VerifyError;
use mach_common::{Callee, Function, Instruction, MReg, Operation, Program, Ty};

/// Run the type check on every internal function.
pub fn check_types(program: &Program) -> Vec<VerifyError> {
    program
        .functions()
        .flat_map(|(name, f)| check_function(name, f))
        .collect()
}

/// Class of every argument of `op`, or `None` for `move`.
fn op_arg_ty(op: &Operation) -> Option<Ty> {
    match op {
        Operation::Move => None,
        Operation::NegF
        | Operation::AbsF
        | Operation::AddF
        | Operation::SubF
        | Operation::MulF
        | Operation::DivF
        | Operation::SingleOfFloat
        | Operation::IntOfFloat => Some(Ty::Float),
        Operation::Cmp(c) => Some(c.arg_ty()),
        _ => Some(Ty::Int),
    }
}

struct Checker<'a> {
    func: &'a str,
    at: usize,
    errors: Vec<VerifyError>,
}

impl Checker<'_> {
    fn arity(&mut self, what: &'static str, expected: usize, found: usize) {
        if expected != found {
            self.errors.push(VerifyError::ArityMismatch {
                func: self.func.to_string(),
                at: self.at,
                what,
                expected,
                found,
            });
        }
    }

    fn class(&mut self, reg: MReg, expected: Ty) {
        if reg.ty() != expected {
            self.errors.push(VerifyError::RegisterClass {
                func: self.func.to_string(),
                at: self.at,
                reg,
                expected,
            });
        }
    }

    fn classes(&mut self, regs: &[MReg], expected: Ty) {
        for &r in regs {
            self.class(r, expected);
        }
    }
}

fn check_function(name: &str, f: &Function) -> Vec<VerifyError> {
    let mut c = Checker {
        func: name,
        at: 0,
        errors: Vec::new(),
    };

    for (at, instr) in f.code.iter().enumerate() {
        c.at = at;
        match instr {
            Instruction::GetStack { ty, dst, .. } | Instruction::GetParam { ty, dst, .. } => {
                c.class(*dst, *ty)
            }
            Instruction::SetStack { src, ty, .. } => c.class(*src, *ty),
            Instruction::Op { op, args, dst } => {
                c.arity(op.mnemonic(), op.arity(), args.len());
                match (op_arg_ty(op), op.result_ty()) {
                    (Some(arg_ty), Some(res_ty)) => {
                        c.classes(args, arg_ty);
                        c.class(*dst, res_ty);
                    }
                    _ => c.classes(args, dst.ty()),
                }
            }
            Instruction::Load {
                chunk,
                addr,
                args,
                dst,
            } => {
                c.arity(addr.mnemonic(), addr.arity(), args.len());
                c.classes(args, Ty::Int);
                c.class(*dst, chunk.ty());
            }
            Instruction::Store {
                chunk,
                addr,
                args,
                src,
            } => {
                c.arity(addr.mnemonic(), addr.arity(), args.len());
                c.classes(args, Ty::Int);
                c.class(*src, chunk.ty());
            }
            Instruction::Call(Callee::Reg(r)) | Instruction::TailCall(Callee::Reg(r)) => {
                c.class(*r, Ty::Int)
            }
            Instruction::Cond { cond, args, .. } => {
                c.arity(cond.mnemonic(), cond.arity(), args.len());
                c.classes(args, cond.arg_ty());
            }
            Instruction::JumpTable { arg, .. } => c.class(*arg, Ty::Int),
            Instruction::Label(_)
            | Instruction::Call(Callee::Symbol(_))
            | Instruction::TailCall(Callee::Symbol(_))
            | Instruction::Goto(_)
            | Instruction::Return => {}
        }
    }

    c.errors
}
