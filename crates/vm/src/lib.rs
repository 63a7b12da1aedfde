//! Mach VM — reference semantics for the Mach register-machine IR.
//!
//! Execution is a small-step state machine over three kinds of state:
//! - `Running`: executing an instruction of an internal function
//! - `CallPending`: about to enter a function
//! - `ReturnPending`: a function has just returned
//!
//! Each internal function owns a fresh memory block as its frame, holding
//! a link slot (the caller's stack pointer) and a return-address slot. The
//! return address of a call site comes from a [`ReturnAddressOracle`];
//! external functions are performed by an [`ExternalCalls`] implementation
//! and produce the events of the trace.
//!
//! # Usage
//!
//! ```
//! use mach_common::{Function, Instruction, MReg, Operation, Program, Signature};
//! use mach_vm::{run, Behavior, RunConfig};
//!
//! let main = Function {
//!     sig: Signature::main(),
//!     code: vec![
//!         Instruction::Op { op: Operation::IntConst(42), args: vec![], dst: MReg::r(0) },
//!         Instruction::Return,
//!     ],
//!     frame_size: 8,
//!     stack_size: 0,
//!     link_ofs: 0,
//!     retaddr_ofs: 1,
//! };
//! let program = Program::new().add_function("main", main);
//!
//! let behavior = run(&program, &RunConfig::default()).unwrap();
//! assert_eq!(behavior, Behavior::Terminates { trace: vec![], code: 42 });
//! ```

pub mod driver;
pub mod error;
pub mod eval;
pub mod execute;
pub mod external;
pub mod frame;
pub mod genv;
pub mod machine;
pub mod oracle;
pub mod state;

pub use driver::{run, Behavior, Execution};
pub use error::{LoadError, Stuck};
pub use execute::Transition;
pub use external::{Event, EventVal, ExternalCalls, ExternalOutcome, HostPrimitives, ScriptedExternals};
pub use genv::Genv;
pub use machine::{Machine, RunConfig, DEFAULT_FUEL};
pub use oracle::{CodeOffsetOracle, ReturnAddressOracle};
pub use state::{CallStack, StackFrame, State};
