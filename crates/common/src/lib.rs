//! Mach common types.
//!
//! This crate provides the data model shared by the Mach VM, verifier and
//! assembler:
//!
//! - [`Value`] — machine values and their partial operators
//! - [`MReg`] / [`RegFile`] — machine registers and the register file
//! - [`Operation`], [`Addressing`], [`Condition`] — operator descriptions
//! - [`Instruction`] — the Mach instruction set
//! - [`Program`] — functions, external primitives and global variables
//! - [`CallingConvention`] — where call arguments and results live

pub mod chunk;
pub mod conventions;
pub mod error;
pub mod instruction;
pub mod op;
pub mod program;
pub mod reg;
pub mod value;

// Re-export commonly used types at the crate root.
pub use chunk::{Chunk, Ty};
pub use conventions::{CallingConvention, Loc};
pub use error::NameError;
pub use instruction::{find_label, Callee, Instruction, Label};
pub use op::{Addressing, Comparison, Condition, Operation};
pub use program::{
    ExternalFunction, FunDef, Function, Global, GlobalVar, InitData, Program, Signature,
    MAX_VAR_SIZE,
};
pub use reg::{MReg, RegFile};
pub use value::{Block, Value};
