//! Stack frame layout.
//!
//! Slot offsets count 4-byte words from a stack pointer. An integer slot
//! occupies one word and a float slot two. Accesses go straight to memory;
//! bounds are enforced there.

use mach_common::{Loc, RegFile, Ty, Value};
use mach_memory::{Mem, MemError};

/// Bytes per slot word.
pub const WORD: i32 = 4;

/// Address of slot `ofs` relative to `sp`.
pub fn slot_address(sp: Value, ofs: i32) -> Result<Value, MemError> {
    sp.add(Value::Int(ofs.wrapping_mul(WORD)))
        .filter(|a| matches!(a, Value::Ptr { .. }))
        .ok_or(MemError::NotAPointer(sp))
}

pub fn load_slot(mem: &Mem, sp: Value, ty: Ty, ofs: i32) -> Result<Value, MemError> {
    mem.loadv(ty.slot_chunk(), slot_address(sp, ofs)?)
}

pub fn store_slot(mem: &mut Mem, sp: Value, ty: Ty, ofs: i32, v: Value) -> Result<(), MemError> {
    mem.storev(ty.slot_chunk(), slot_address(sp, ofs)?, v)
}

/// Read `reg` or an outgoing slot of the caller's frame.
fn read_loc(regs: &RegFile, mem: &Mem, parent_sp: Value, loc: Loc) -> Result<Value, MemError> {
    match loc {
        Loc::Reg(r) => Ok(regs.get(r)),
        Loc::Outgoing { ofs, ty } => load_slot(mem, parent_sp, ty, ofs),
    }
}

/// Gather the arguments of an external call from their convention locations.
pub fn extcall_arguments(
    regs: &RegFile,
    mem: &Mem,
    parent_sp: Value,
    locs: &[Loc],
) -> Result<Vec<Value>, MemError> {
    locs.iter()
        .map(|&loc| read_loc(regs, mem, parent_sp, loc))
        .collect()
}
