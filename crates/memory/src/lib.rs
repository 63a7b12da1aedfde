//! Mach memory — disjoint, independently bounded blocks.
//!
//! Memory is a set of blocks. Each block has bounds `[lo, hi)` fixed at
//! allocation; addresses are `(block, offset)` pairs. Blocks are never
//! reused, so a pointer into a freed block stays invalid forever.
//!
//! # Usage
//!
//! ```
//! use mach_common::{Chunk, Value};
//! use mach_memory::Mem;
//!
//! let mut mem = Mem::new();
//! let b = mem.alloc(0, 8);
//! mem.store(Chunk::Int32, b, 4, Value::Int(42)).unwrap();
//! assert_eq!(mem.load(Chunk::Int32, b, 4), Ok(Value::Int(42)));
//! mem.free(b, 0, 8).unwrap();
//! assert!(mem.load(Chunk::Int32, b, 4).is_err());
//! ```

pub mod error;
pub mod memval;

pub use error::MemError;
pub use memval::MemVal;

use mach_common::{Block, Chunk, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
struct BlockData {
    lo: i32,
    hi: i32,
    /// One entry per byte, index 0 holding offset `lo`.
    contents: Vec<MemVal>,
}

/// The memory state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mem {
    /// Indexed by block number; slot 0 is never used. `None` once freed.
    /// Block numbers are never reused, so this grows by one entry per
    /// allocation for the whole run; only the caller's step budget bounds it.
    blocks: Vec<Option<BlockData>>,
}

impl Default for Mem {
    fn default() -> Self {
        Self::new()
    }
}

impl Mem {
    /// Empty memory with no blocks.
    pub fn new() -> Self {
        Self { blocks: vec![None] }
    }

    /// Allocate a fresh block with bounds `[lo, hi)` and undefined contents.
    /// An empty range (`hi <= lo`) yields a block with no accessible bytes.
    /// Freed blocks keep their number, so every call grows the table.
    pub fn alloc(&mut self, lo: i32, hi: i32) -> Block {
        let len = (hi as i64 - lo as i64).max(0) as usize;
        self.blocks.push(Some(BlockData {
            lo,
            hi: hi.max(lo),
            contents: vec![MemVal::Undef; len],
        }));
        (self.blocks.len() - 1) as Block
    }

    /// Free `block`, whose bounds must be exactly `[lo, hi)`.
    pub fn free(&mut self, block: Block, lo: i32, hi: i32) -> Result<(), MemError> {
        let data = self.block(block)?;
        if data.lo != lo || data.hi != hi.max(lo) {
            return Err(MemError::BadFree { block, lo, hi });
        }
        self.blocks[block as usize] = None;
        Ok(())
    }

    /// Whether `block` is allocated and not yet freed.
    pub fn is_valid(&self, block: Block) -> bool {
        self.block(block).is_ok()
    }

    /// Bounds of a live block.
    pub fn bounds(&self, block: Block) -> Option<(i32, i32)> {
        self.block(block).ok().map(|d| (d.lo, d.hi))
    }

    /// Number of blocks ever allocated.
    pub fn next_block(&self) -> Block {
        self.blocks.len() as Block
    }

    pub fn load(&self, chunk: Chunk, block: Block, offset: i32) -> Result<Value, MemError> {
        let data = self.block(block)?;
        let start = check_access(data, chunk, block, offset)?;
        Ok(memval::decode(
            chunk,
            &data.contents[start..start + chunk.size() as usize],
        ))
    }

    pub fn store(
        &mut self,
        chunk: Chunk,
        block: Block,
        offset: i32,
        v: Value,
    ) -> Result<(), MemError> {
        let data = self.block_mut(block)?;
        let start = check_access(data, chunk, block, offset)?;
        let mvs = memval::encode(chunk, v);
        data.contents[start..start + mvs.len()].copy_from_slice(&mvs);
        Ok(())
    }

    /// Load through a pointer value.
    pub fn loadv(&self, chunk: Chunk, addr: Value) -> Result<Value, MemError> {
        match addr {
            Value::Ptr { block, offset } => self.load(chunk, block, offset),
            other => Err(MemError::NotAPointer(other)),
        }
    }

    /// Store through a pointer value.
    pub fn storev(&mut self, chunk: Chunk, addr: Value, v: Value) -> Result<(), MemError> {
        match addr {
            Value::Ptr { block, offset } => self.store(chunk, block, offset, v),
            other => Err(MemError::NotAPointer(other)),
        }
    }

    fn block(&self, block: Block) -> Result<&BlockData, MemError> {
        self.blocks
            .get(block as usize)
            .and_then(Option::as_ref)
            .ok_or(MemError::InvalidBlock { block })
    }

    fn block_mut(&mut self, block: Block) -> Result<&mut BlockData, MemError> {
        self.blocks
            .get_mut(block as usize)
            .and_then(Option::as_mut)
            .ok_or(MemError::InvalidBlock { block })
    }
}

/// Index into `data.contents` of the first byte accessed.
fn check_access(
    data: &BlockData,
    chunk: Chunk,
    block: Block,
    offset: i32,
) -> Result<usize, MemError> {
    let end = offset as i64 + chunk.size() as i64;
    if (offset as i64) < data.lo as i64 || end > data.hi as i64 {
        return Err(MemError::OutOfBounds {
            chunk,
            block,
            offset,
            lo: data.lo,
            hi: data.hi,
        });
    }
    if offset.rem_euclid(chunk.align()) != 0 {
        return Err(MemError::Misaligned {
            chunk,
            block,
            offset,
        });
    }
    Ok((offset as i64 - data.lo as i64) as usize)
}
