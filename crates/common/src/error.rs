//! Name lookup errors for Mach identifiers.

use thiserror::Error;

/// Errors from parsing a textual name into one of the Mach enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Not a register name (`r0`..`r15`, `f0`..`f15`).
    #[error("unknown register '{0}'")]
    UnknownRegister(String),

    /// Not a value type (`int`, `float`).
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// Not a memory chunk name.
    #[error("unknown memory chunk '{0}'")]
    UnknownChunk(String),

    /// Not a comparison (`eq`, `ne`, `lt`, `le`, `gt`, `ge`).
    #[error("unknown comparison '{0}'")]
    UnknownComparison(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_register() {
        assert_eq!(
            NameError::UnknownRegister("r99".to_string()).to_string(),
            "unknown register 'r99'"
        );
    }

    #[test]
    fn display_unknown_chunk() {
        assert_eq!(
            NameError::UnknownChunk("int64".to_string()).to_string(),
            "unknown memory chunk 'int64'"
        );
    }
}
