//! Machine states and the call stack.

use mach_common::{Block, RegFile, Value};
use mach_memory::Mem;

/// Activation record of a suspended caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Identity of the suspended function.
    pub func: Block,
    /// Its stack pointer.
    pub sp: Value,
    /// Return address recorded for the call site.
    pub ra: Value,
    /// Index of the instruction to resume at.
    pub pc: usize,
}

/// Suspended callers, innermost last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStack {
    frames: Vec<StackFrame>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: StackFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<StackFrame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn top(&self) -> Option<&StackFrame> {
        self.frames.last()
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Stack pointer of the innermost caller, or `NULLPTR` at the outermost level.
    pub fn parent_sp(&self) -> Value {
        self.top().map_or(Value::NULLPTR, |f| f.sp)
    }

    /// Return address of the innermost caller, or `ZERO` at the outermost level.
    pub fn parent_ra(&self) -> Value {
        self.top().map_or(Value::ZERO, |f| f.ra)
    }
}

/// A machine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// Executing instruction `pc` of function `func` with frame pointer `sp`.
    Running {
        stack: CallStack,
        func: Block,
        sp: Value,
        pc: usize,
        regs: RegFile,
        mem: Mem,
    },
    /// About to enter `callee`; arguments are in registers and the caller's
    /// outgoing slots.
    CallPending {
        stack: CallStack,
        callee: Block,
        regs: RegFile,
        mem: Mem,
    },
    /// A function has returned; its result is in the result register.
    ReturnPending {
        stack: CallStack,
        regs: RegFile,
        mem: Mem,
    },
}

impl State {
    pub fn stack(&self) -> &CallStack {
        match self {
            State::Running { stack, .. }
            | State::CallPending { stack, .. }
            | State::ReturnPending { stack, .. } => stack,
        }
    }

    pub fn regs(&self) -> &RegFile {
        match self {
            State::Running { regs, .. }
            | State::CallPending { regs, .. }
            | State::ReturnPending { regs, .. } => regs,
        }
    }

    pub fn mem(&self) -> &Mem {
        match self {
            State::Running { mem, .. }
            | State::CallPending { mem, .. }
            | State::ReturnPending { mem, .. } => mem,
        }
    }

    /// Number of suspended callers.
    pub fn depth(&self) -> usize {
        self.stack().depth()
    }

    /// Whether the outermost function has returned.
    pub fn is_final(&self) -> bool {
        matches!(self, State::ReturnPending { stack, .. } if stack.is_empty())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            State::Running { .. } => "running",
            State::CallPending { .. } => "call-pending",
            State::ReturnPending { .. } => "return-pending",
        }
    }
}
