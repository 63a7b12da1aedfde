//! Value types and memory access widths.

use crate::error::NameError;
use std::str::FromStr;

/// The type of a register, stack slot, or signature position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ty {
    /// 32-bit integers and pointers. Occupies one word.
    Int,
    /// 64-bit floats. Occupies two words.
    Float,
}

/// All types, for iteration in lookups and tests.
pub const ALL_TYPES: [Ty; 2] = [Ty::Int, Ty::Float];

impl Ty {
    /// Textual name used by the assembler.
    pub fn name(self) -> &'static str {
        match self {
            Ty::Int => "int",
            Ty::Float => "float",
        }
    }

    /// Size in 4-byte words.
    pub fn words(self) -> i32 {
        match self {
            Ty::Int => 1,
            Ty::Float => 2,
        }
    }

    /// The chunk used to spill a value of this type into a stack slot.
    pub fn slot_chunk(self) -> Chunk {
        match self {
            Ty::Int => Chunk::Int32,
            Ty::Float => Chunk::Float64,
        }
    }
}

impl FromStr for Ty {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_TYPES
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| NameError::UnknownType(s.to_string()))
    }
}

/// Width and interpretation of a memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chunk {
    Int8Signed,
    Int8Unsigned,
    Int16Signed,
    Int16Unsigned,
    Int32,
    Float32,
    Float64,
}

/// All chunks in declaration order.
pub const ALL_CHUNKS: [Chunk; 7] = [
    Chunk::Int8Signed,
    Chunk::Int8Unsigned,
    Chunk::Int16Signed,
    Chunk::Int16Unsigned,
    Chunk::Int32,
    Chunk::Float32,
    Chunk::Float64,
];

impl Chunk {
    /// Textual name used by the assembler.
    pub fn name(self) -> &'static str {
        match self {
            Chunk::Int8Signed => "int8s",
            Chunk::Int8Unsigned => "int8u",
            Chunk::Int16Signed => "int16s",
            Chunk::Int16Unsigned => "int16u",
            Chunk::Int32 => "int32",
            Chunk::Float32 => "float32",
            Chunk::Float64 => "float64",
        }
    }

    /// Number of bytes accessed.
    pub fn size(self) -> i32 {
        match self {
            Chunk::Int8Signed | Chunk::Int8Unsigned => 1,
            Chunk::Int16Signed | Chunk::Int16Unsigned => 2,
            Chunk::Int32 | Chunk::Float32 => 4,
            Chunk::Float64 => 8,
        }
    }

    /// Required alignment of the byte offset. Doubles are word aligned.
    pub fn align(self) -> i32 {
        match self {
            Chunk::Int8Signed | Chunk::Int8Unsigned => 1,
            Chunk::Int16Signed | Chunk::Int16Unsigned => 2,
            Chunk::Int32 | Chunk::Float32 | Chunk::Float64 => 4,
        }
    }

    /// Type of the values this chunk loads.
    pub fn ty(self) -> Ty {
        match self {
            Chunk::Float32 | Chunk::Float64 => Ty::Float,
            _ => Ty::Int,
        }
    }
}

impl FromStr for Chunk {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_CHUNKS
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| NameError::UnknownChunk(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_chunks() {
        assert_eq!(Ty::Int.slot_chunk(), Chunk::Int32);
        assert_eq!(Ty::Float.slot_chunk(), Chunk::Float64);
        assert_eq!(Ty::Float.words(), 2);
    }

    #[test]
    fn names_parse_back() {
        for c in ALL_CHUNKS {
            assert_eq!(c.name().parse::<Chunk>(), Ok(c));
        }
        for t in ALL_TYPES {
            assert_eq!(t.name().parse::<Ty>(), Ok(t));
        }
    }

    #[test]
    fn unknown_chunk() {
        assert_eq!(
            "int64".parse::<Chunk>(),
            Err(NameError::UnknownChunk("int64".to_string()))
        );
    }

    #[test]
    fn sizes_and_alignment() {
        assert_eq!(Chunk::Int16Signed.size(), 2);
        assert_eq!(Chunk::Float64.size(), 8);
        assert_eq!(Chunk::Float64.align(), 4);
        assert_eq!(Chunk::Float32.ty(), Ty::Float);
    }
}
