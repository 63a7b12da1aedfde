//! Memory access errors.
//!
//! Every failed access names the block and offset involved so that a stuck
//! execution can be diagnosed from the error alone.

use mach_common::{Block, Chunk, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemError {
    /// The block was never allocated or has been freed.
    #[error("block {block} is not allocated")]
    InvalidBlock { block: Block },

    /// The access does not fit inside the block's bounds.
    #[error("{chunk:?} access at {block}+{offset} outside bounds [{lo}, {hi})")]
    OutOfBounds {
        chunk: Chunk,
        block: Block,
        offset: i32,
        lo: i32,
        hi: i32,
    },

    /// The offset is not a multiple of the chunk's alignment.
    #[error("misaligned {chunk:?} access at {block}+{offset}")]
    Misaligned {
        chunk: Chunk,
        block: Block,
        offset: i32,
    },

    /// A load or store through something other than a pointer.
    #[error("address {0} is not a pointer")]
    NotAPointer(Value),

    /// `free` with bounds that do not match the allocation.
    #[error("cannot free block {block} with bounds [{lo}, {hi})")]
    BadFree { block: Block, lo: i32, hi: i32 },
}
