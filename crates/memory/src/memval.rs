//! Byte-level contents of memory.
//!
//! Numbers are stored as little-endian bytes. Pointers have no byte
//! representation; a pointer stored with `Int32` becomes four fragments that
//! decode back to the same pointer only when read together, in order, with
//! `Int32`.

use mach_common::{Block, Chunk, Value};

/// Contents of one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemVal {
    Undef,
    Byte(u8),
    /// Byte `index` of the 4-byte representation of a pointer.
    Fragment { block: Block, offset: i32, index: u8 },
}

/// Byte representation of `v` written with `chunk`.
///
/// Values whose kind does not match the chunk are stored as undefined bytes.
pub(crate) fn encode(chunk: Chunk, v: Value) -> Vec<MemVal> {
    let size = chunk.size() as usize;
    let bytes = |le: &[u8]| -> Vec<MemVal> { le[..size].iter().map(|&b| MemVal::Byte(b)).collect() };
    match (chunk, v) {
        (
            Chunk::Int8Signed
            | Chunk::Int8Unsigned
            | Chunk::Int16Signed
            | Chunk::Int16Unsigned
            | Chunk::Int32,
            Value::Int(n),
        ) => bytes(&n.to_le_bytes()),
        (Chunk::Int32, Value::Ptr { block, offset }) => (0..4)
            .map(|index| MemVal::Fragment {
                block,
                offset,
                index,
            })
            .collect(),
        (Chunk::Float32, Value::Float(x)) => bytes(&(x as f32).to_le_bytes()),
        (Chunk::Float64, Value::Float(x)) => bytes(&x.to_le_bytes()),
        _ => vec![MemVal::Undef; size],
    }
}

/// Value read with `chunk` from `mvs` (exactly `chunk.size()` bytes).
pub(crate) fn decode(chunk: Chunk, mvs: &[MemVal]) -> Value {
    if let Some(raw) = concrete_bytes(mvs) {
        let mut le = [0u8; 8];
        le[..raw.len()].copy_from_slice(&raw);
        return match chunk {
            Chunk::Int8Signed => Value::Int(le[0] as i8 as i32),
            Chunk::Int8Unsigned => Value::Int(le[0] as i32),
            Chunk::Int16Signed => Value::Int(i16::from_le_bytes([le[0], le[1]]) as i32),
            Chunk::Int16Unsigned => Value::Int(u16::from_le_bytes([le[0], le[1]]) as i32),
            Chunk::Int32 => Value::Int(i32::from_le_bytes([le[0], le[1], le[2], le[3]])),
            Chunk::Float32 => {
                Value::Float(f32::from_le_bytes([le[0], le[1], le[2], le[3]]) as f64)
            }
            Chunk::Float64 => Value::Float(f64::from_le_bytes(le)),
        };
    }
    if chunk == Chunk::Int32 {
        if let Some(p) = pointer(mvs) {
            return p;
        }
    }
    Value::Undef
}

fn concrete_bytes(mvs: &[MemVal]) -> Option<Vec<u8>> {
    mvs.iter()
        .map(|mv| match mv {
            MemVal::Byte(b) => Some(*b),
            _ => None,
        })
        .collect()
}

fn pointer(mvs: &[MemVal]) -> Option<Value> {
    let (block, offset) = match mvs.first()? {
        MemVal::Fragment { block, offset, .. } => (*block, *offset),
        _ => return None,
    };
    let intact = mvs.iter().enumerate().all(|(i, mv)| {
        *mv == MemVal::Fragment {
            block,
            offset,
            index: i as u8,
        }
    });
    intact.then_some(Value::Ptr { block, offset })
}
