//! The machine: global environment, injected oracles and run configuration.

use crate::error::{LoadError, Stuck};
use crate::external::{ExternalCalls, HostPrimitives};
use crate::genv::Genv;
use crate::oracle::{CodeOffsetOracle, ReturnAddressOracle};
use crate::state::{CallStack, State};
use mach_common::{Block, CallingConvention, FunDef, Function, RegFile, Signature, Value};
use mach_memory::Mem;

/// Step budget used when none is given.
pub const DEFAULT_FUEL: u64 = 10_000_000;

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum number of steps before the run is reported as diverging.
    pub fuel: u64,
    pub convention: CallingConvention,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fuel: DEFAULT_FUEL,
            convention: CallingConvention::default(),
        }
    }
}

/// Executes states of one program.
///
/// The machine holds no execution state of its own apart from whatever the
/// external call interface keeps; every step takes a [`State`] and returns
/// the next one.
pub struct Machine<'g> {
    pub(crate) genv: &'g Genv,
    pub(crate) oracle: Box<dyn ReturnAddressOracle + 'g>,
    pub(crate) externals: Box<dyn ExternalCalls + 'g>,
    pub(crate) conv: CallingConvention,
}

impl<'g> Machine<'g> {
    /// A machine using [`CodeOffsetOracle`] and [`HostPrimitives`].
    pub fn new(genv: &'g Genv, conv: CallingConvention) -> Self {
        Self {
            genv,
            oracle: Box::new(CodeOffsetOracle),
            externals: Box::new(HostPrimitives),
            conv,
        }
    }

    pub fn with_oracle(mut self, oracle: impl ReturnAddressOracle + 'g) -> Self {
        self.oracle = Box::new(oracle);
        self
    }

    pub fn with_externals(mut self, externals: impl ExternalCalls + 'g) -> Self {
        self.externals = Box::new(externals);
        self
    }

    pub fn genv(&self) -> &'g Genv {
        self.genv
    }

    pub fn convention(&self) -> &CallingConvention {
        &self.conv
    }

    /// The state that calls `entry` with an empty call stack and every
    /// register undefined.
    pub fn initial_state(&self, entry: &str, mem: Mem) -> Result<State, LoadError> {
        let callee = self
            .genv
            .find_symbol(entry)
            .ok_or_else(|| LoadError::MissingEntry(entry.to_string()))?;
        if self.genv.find_funct_ptr(callee).is_none() {
            return Err(LoadError::EntryNotFunction(entry.to_string()));
        }
        Ok(State::CallPending {
            stack: CallStack::new(),
            callee,
            regs: RegFile::new(),
            mem,
        })
    }

    /// Whether the next step from `state` calls an external function. These
    /// are the only steps whose outcome is not fixed by the state.
    pub fn is_external_step(&self, state: &State) -> bool {
        matches!(
            state,
            State::CallPending { callee, .. }
                if matches!(self.genv.find_funct_ptr(*callee), Some(FunDef::External(_)))
        )
    }

    /// Exit code of a final state: the integer in the result register of a
    /// `() -> int` function. `Ok(None)` if the state is not final.
    pub fn exit_code(&self, state: &State) -> Result<Option<i32>, Stuck> {
        if !state.is_final() {
            return Ok(None);
        }
        match state.regs().get(self.conv.loc_result(&Signature::main())) {
            Value::Int(n) => Ok(Some(n)),
            other => Err(Stuck::BadExitValue(other)),
        }
    }

    /// Code of the function identified by `fb`.
    pub(crate) fn internal(&self, fb: Block) -> Result<&'g Function, Stuck> {
        match self.genv.find_funct_ptr(fb) {
            Some(FunDef::Internal(f)) => Ok(f),
            Some(FunDef::External(_)) => Err(Stuck::NotInternal(fb)),
            None => Err(Stuck::UnknownFunction(fb)),
        }
    }

    /// Symbol name of `fb` for log fields.
    pub(crate) fn name(&self, fb: Block) -> &'g str {
        self.genv.name_of(fb).unwrap_or("?")
    }
}
