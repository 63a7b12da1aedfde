//! Frame layout and size checks.
//!
//! A frame spans bytes `[0, frame_size)` above the stack pointer, in word
//! slots. The link and return-address slots must be distinct and lie inside
//! the frame, and so must every `getstack` / `setstack` slot.
//!
//! A direct call passes its stack arguments in words `[0, n)` of the
//! caller's frame, so that area must fit and stay clear of the link and
//! return-address slots. A tail call frees the frame before the callee
//! reads it, so it may not pass stack arguments at all.

use crate::error::VerifyError;
use mach_common::{
    CallingConvention, Callee, Function, Global, Instruction, Program, Ty, MAX_VAR_SIZE,
};

/// Maximum `frame_size + stack_size` in bytes.
pub const MAX_FRAME_SIZE: i32 = 1 << 20;

const WORD: i32 = 4;

/// Run the size checks on every variable and the frame checks on every
/// internal function, with stack arguments placed by `conv`.
pub fn check_limits(program: &Program, conv: &CallingConvention) -> Vec<VerifyError> {
    let mut errors: Vec<VerifyError> = program
        .globals
        .iter()
        .filter_map(|(name, g)| match g {
            Global::Var(var) if var.size() > MAX_VAR_SIZE as i64 => Some(VerifyError::VarTooLarge {
                name: name.clone(),
                size: var.size(),
                max: MAX_VAR_SIZE,
            }),
            _ => None,
        })
        .collect();
    for (name, f) in program.functions() {
        errors.extend(check_function(name, f));
        errors.extend(check_outgoing(program, conv, name, f));
    }
    errors
}

fn check_function(name: &str, f: &Function) -> Vec<VerifyError> {
    let mut errors = Vec::new();
    let func = || name.to_string();

    for (what, size) in [("frame size", f.frame_size), ("stack size", f.stack_size)] {
        if size < 0 || size % WORD != 0 {
            errors.push(VerifyError::BadSize {
                func: func(),
                what,
                size,
            });
        }
    }
    let total = f.frame_size as i64 + f.stack_size as i64;
    if total > MAX_FRAME_SIZE as i64 {
        errors.push(VerifyError::FrameTooLarge {
            func: func(),
            size: total,
            max: MAX_FRAME_SIZE,
        });
    }

    for (what, ofs) in [("link", f.link_ofs), ("return-address", f.retaddr_ofs)] {
        if !slot_fits(f, ofs, Ty::Int) {
            errors.push(VerifyError::ReservedSlotOutOfFrame {
                func: func(),
                what,
                ofs,
            });
        }
    }
    if f.link_ofs == f.retaddr_ofs {
        errors.push(VerifyError::ReservedSlotsOverlap {
            func: func(),
            ofs: f.link_ofs,
        });
    }

    for (at, instr) in f.code.iter().enumerate() {
        match instr {
            Instruction::GetStack { ofs, ty, .. } | Instruction::SetStack { ofs, ty, .. } => {
                if !slot_fits(f, *ofs, *ty) {
                    errors.push(VerifyError::SlotOutOfFrame {
                        func: func(),
                        at,
                        ofs: *ofs,
                    });
                }
            }
            Instruction::GetParam { ofs, .. } if *ofs < 0 => {
                errors.push(VerifyError::NegativeParam {
                    func: func(),
                    at,
                    ofs: *ofs,
                });
            }
            _ => {}
        }
    }

    errors
}

fn check_outgoing(
    program: &Program,
    conv: &CallingConvention,
    name: &str,
    f: &Function,
) -> Vec<VerifyError> {
    let mut errors = Vec::new();
    for (at, instr) in f.code.iter().enumerate() {
        let (tail, callee) = match instr {
            Instruction::Call(Callee::Symbol(s)) => (false, s),
            Instruction::TailCall(Callee::Symbol(s)) => (true, s),
            _ => continue,
        };
        // Unknown callees and variables are reported by the globals pass.
        let Some(Global::Fun(fd)) = program.global(callee) else {
            continue;
        };
        let words = conv.outgoing_words(fd.sig());
        if words == 0 {
            continue;
        }
        if tail {
            errors.push(VerifyError::TailCallStackArguments {
                func: name.to_string(),
                at,
                callee: callee.clone(),
                words,
            });
            continue;
        }
        if words as i64 * WORD as i64 > f.frame_size as i64 {
            errors.push(VerifyError::OutgoingOutOfFrame {
                func: name.to_string(),
                at,
                callee: callee.clone(),
                words,
            });
        }
        for (what, ofs) in [("link", f.link_ofs), ("return-address", f.retaddr_ofs)] {
            if (0..words).contains(&ofs) {
                errors.push(VerifyError::OutgoingOverlapsSlot {
                    func: name.to_string(),
                    at,
                    callee: callee.clone(),
                    what,
                    ofs,
                });
            }
        }
    }
    errors
}

/// Whether a slot of type `ty` at word `ofs` lies inside the frame.
fn slot_fits(f: &Function, ofs: i32, ty: Ty) -> bool {
    let end = (ofs as i64 + ty.words() as i64) * WORD as i64;
    ofs >= 0 && end <= f.frame_size as i64
}
