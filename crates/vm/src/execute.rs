//! The transition function.

use crate::error::Stuck;
use crate::eval::{eval_addressing, eval_condition, eval_operation};
use crate::external::Event;
use crate::frame::{extcall_arguments, load_slot, store_slot};
use crate::machine::Machine;
use crate::state::{CallStack, StackFrame, State};
use mach_common::{find_label, Block, Callee, FunDef, Function, Instruction, Label, RegFile, Ty, Value};
use mach_memory::{Mem, MemError};
use tracing::{debug, trace};

/// A successful step: the events it produced and the next state.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub events: Vec<Event>,
    pub state: State,
}

impl Transition {
    fn silent(state: State) -> Self {
        Self {
            events: Vec::new(),
            state,
        }
    }
}

impl<'g> Machine<'g> {
    /// Take one step from `state`.
    ///
    /// # Errors
    ///
    /// Returns [`Stuck`] when no transition applies, including from a final
    /// state ([`Stuck::Finished`]).
    pub fn step(&mut self, state: State) -> Result<Transition, Stuck> {
        match state {
            State::Running {
                stack,
                func,
                sp,
                pc,
                regs,
                mem,
            } => self.exec_instruction(stack, func, sp, pc, regs, mem),
            State::CallPending {
                stack,
                callee,
                regs,
                mem,
            } => self.enter(stack, callee, regs, mem),
            State::ReturnPending {
                mut stack,
                regs,
                mem,
            } => {
                let frame = stack.pop().ok_or(Stuck::Finished)?;
                debug!(
                    to = self.name(frame.func),
                    depth = stack.depth(),
                    "return"
                );
                Ok(Transition::silent(State::Running {
                    stack,
                    func: frame.func,
                    sp: frame.sp,
                    pc: frame.pc,
                    regs,
                    mem,
                }))
            }
        }
    }

    fn exec_instruction(
        &mut self,
        mut stack: CallStack,
        func: Block,
        sp: Value,
        pc: usize,
        mut regs: RegFile,
        mut mem: Mem,
    ) -> Result<Transition, Stuck> {
        let f = self.internal(func)?;
        let instr = f.code.get(pc).ok_or(Stuck::EndOfCode)?;
        trace!(func = self.name(func), pc, instr = instr.mnemonic(), "exec");

        let mut next = pc + 1;
        match instr {
            Instruction::Label(_) => {}
            Instruction::GetStack { ofs, ty, dst } => {
                regs.set(*dst, load_slot(&mem, sp, *ty, *ofs)?);
            }
            Instruction::SetStack { src, ofs, ty } => {
                store_slot(&mut mem, sp, *ty, *ofs, regs.get(*src))?;
            }
            Instruction::GetParam { ofs, ty, dst } => {
                let parent = load_slot(&mem, sp, Ty::Int, f.link_ofs)?;
                regs.set(*dst, load_slot(&mem, parent, *ty, *ofs)?);
            }
            Instruction::Op { op, args, dst } => {
                let v = eval_operation(self.genv, op, sp, &regs.get_list(args))
                    .ok_or(Stuck::UndefinedOperation { op: op.mnemonic() })?;
                regs.set(*dst, v);
            }
            Instruction::Load {
                chunk,
                addr,
                args,
                dst,
            } => {
                let a = eval_addressing(self.genv, addr, sp, &regs.get_list(args))
                    .ok_or(Stuck::UndefinedAddress {
                        mode: addr.mnemonic(),
                    })?;
                regs.set(*dst, mem.loadv(*chunk, a)?);
            }
            Instruction::Store {
                chunk,
                addr,
                args,
                src,
            } => {
                let a = eval_addressing(self.genv, addr, sp, &regs.get_list(args))
                    .ok_or(Stuck::UndefinedAddress {
                        mode: addr.mnemonic(),
                    })?;
                mem.storev(*chunk, a, regs.get(*src))?;
            }
            Instruction::Call(callee) => {
                let target = self.resolve_callee(callee, &regs)?;
                let ra = self
                    .oracle
                    .return_address(func, f, &f.code[next..])
                    .ok_or(Stuck::NoReturnAddress)?;
                stack.push(StackFrame {
                    func,
                    sp,
                    ra,
                    pc: next,
                });
                debug!(
                    from = self.name(func),
                    to = self.name(target),
                    depth = stack.depth(),
                    "call"
                );
                return Ok(Transition::silent(State::CallPending {
                    stack,
                    callee: target,
                    regs,
                    mem,
                }));
            }
            Instruction::TailCall(callee) => {
                let target = self.resolve_callee(callee, &regs)?;
                release_frame(f, sp, &stack, &mut mem)?;
                debug!(
                    from = self.name(func),
                    to = self.name(target),
                    depth = stack.depth(),
                    "tail call"
                );
                return Ok(Transition::silent(State::CallPending {
                    stack,
                    callee: target,
                    regs,
                    mem,
                }));
            }
            Instruction::Goto(lbl) => next = jump(f, *lbl)?,
            Instruction::Cond { cond, args, target } => {
                let taken = eval_condition(cond, &regs.get_list(args)).ok_or(
                    Stuck::UndefinedCondition {
                        cond: cond.mnemonic(),
                    },
                )?;
                if taken {
                    next = jump(f, *target)?;
                }
            }
            Instruction::JumpTable { arg, targets } => {
                let v = regs.get(*arg);
                let lbl = match v {
                    Value::Int(n) => usize::try_from(n).ok().and_then(|i| targets.get(i)),
                    _ => None,
                }
                .ok_or(Stuck::BadJumpTableIndex(v))?;
                next = jump(f, *lbl)?;
            }
            Instruction::Return => {
                release_frame(f, sp, &stack, &mut mem)?;
                return Ok(Transition::silent(State::ReturnPending { stack, regs, mem }));
            }
        }

        Ok(Transition::silent(State::Running {
            stack,
            func,
            sp,
            pc: next,
            regs,
            mem,
        }))
    }

    fn enter(
        &mut self,
        stack: CallStack,
        callee: Block,
        mut regs: RegFile,
        mut mem: Mem,
    ) -> Result<Transition, Stuck> {
        let fd = self
            .genv
            .find_funct_ptr(callee)
            .ok_or(Stuck::UnknownFunction(callee))?;
        match fd {
            FunDef::Internal(f) => {
                let stk = mem.alloc(-f.frame_size, f.stack_size);
                let sp = Value::ptr(stk, -f.frame_size);
                store_slot(&mut mem, sp, Ty::Int, f.link_ofs, stack.parent_sp())?;
                store_slot(&mut mem, sp, Ty::Int, f.retaddr_ofs, stack.parent_ra())?;
                debug!(
                    func = self.name(callee),
                    block = stk,
                    frame_size = f.frame_size,
                    stack_size = f.stack_size,
                    "frame allocated"
                );
                Ok(Transition::silent(State::Running {
                    stack,
                    func: callee,
                    sp,
                    pc: 0,
                    regs,
                    mem,
                }))
            }
            FunDef::External(ef) => {
                let locs = self.conv.loc_arguments(&ef.sig);
                let args = extcall_arguments(&regs, &mem, stack.parent_sp(), &locs)?;
                let outcome = self
                    .externals
                    .call(ef, &args)
                    .ok_or_else(|| Stuck::ExternalCallFailed {
                        name: ef.name.clone(),
                    })?;
                debug!(
                    name = %ef.name,
                    result = %outcome.result,
                    events = outcome.events.len(),
                    "external call"
                );
                regs.set(self.conv.loc_result(&ef.sig), outcome.result);
                Ok(Transition {
                    events: outcome.events,
                    state: State::ReturnPending { stack, regs, mem },
                })
            }
        }
    }

    fn resolve_callee(&self, callee: &Callee, regs: &RegFile) -> Result<Block, Stuck> {
        match callee {
            Callee::Reg(r) => {
                let v = regs.get(*r);
                self.genv.find_funct(v).ok_or(Stuck::NotAFunction(v))
            }
            Callee::Symbol(s) => {
                let b = self
                    .genv
                    .find_symbol(s)
                    .ok_or_else(|| Stuck::UnknownSymbol(s.clone()))?;
                self.genv
                    .find_funct_ptr(b)
                    .map(|_| b)
                    .ok_or(Stuck::NotAFunction(Value::ptr(b, 0)))
            }
        }
    }
}

fn jump(f: &Function, lbl: Label) -> Result<usize, Stuck> {
    find_label(&f.code, lbl).ok_or(Stuck::MissingLabel(lbl))
}

/// Check the frame's link and return-address slots against the caller's
/// record, then free the frame.
fn release_frame(f: &Function, sp: Value, stack: &CallStack, mem: &mut Mem) -> Result<(), Stuck> {
    let link = load_slot(mem, sp, Ty::Int, f.link_ofs)?;
    let expected = stack.parent_sp();
    if link != expected {
        return Err(Stuck::LinkMismatch {
            stored: link,
            expected,
        });
    }
    let ra = load_slot(mem, sp, Ty::Int, f.retaddr_ofs)?;
    let expected = stack.parent_ra();
    if ra != expected {
        return Err(Stuck::ReturnAddressMismatch {
            stored: ra,
            expected,
        });
    }
    let Value::Ptr { block, .. } = sp else {
        return Err(MemError::NotAPointer(sp).into());
    };
    mem.free(block, -f.frame_size, f.stack_size)?;
    debug!(block, "frame freed");
    Ok(())
}
