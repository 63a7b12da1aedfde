//! Return addresses for call sites.
//!
//! The machine itself does not know how code is laid out, so the value a
//! call records as its return address comes from an oracle. The only
//! requirement is that the oracle is a function of the call site.

use mach_common::{Block, Function, Instruction, Value};

pub trait ReturnAddressOracle {
    /// Return address for a call in function `fb` whose remaining code after
    /// the call is `continuation`. `None` if the call site has no address.
    fn return_address(
        &self,
        fb: Block,
        function: &Function,
        continuation: &[Instruction],
    ) -> Option<Value>;
}

/// Addresses a call site by its position in the function's code:
/// `Ptr(fb, index of the first instruction after the call)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeOffsetOracle;

impl ReturnAddressOracle for CodeOffsetOracle {
    fn return_address(
        &self,
        fb: Block,
        function: &Function,
        continuation: &[Instruction],
    ) -> Option<Value> {
        let index = function.code.len().checked_sub(continuation.len())?;
        let ofs = i32::try_from(index).ok()?;
        Some(Value::ptr(fb, ofs))
    }
}
