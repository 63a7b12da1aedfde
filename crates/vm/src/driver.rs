//! Whole-program runs.

use crate::error::{LoadError, Stuck};
use crate::external::Event;
use crate::genv::Genv;
use crate::machine::{Machine, RunConfig};
use crate::state::State;
use mach_common::Program;
use tracing::info;

/// Observable behavior of a whole program, with the events produced on the way.
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    /// Returned from the entry point with an integer exit code.
    Terminates { trace: Vec<Event>, code: i32 },
    /// Reached a state with no transition.
    GoesWrong { trace: Vec<Event>, reason: Stuck },
    /// Still running when the step budget ran out.
    Diverges { trace: Vec<Event> },
}

impl Behavior {
    pub fn trace(&self) -> &[Event] {
        match self {
            Behavior::Terminates { trace, .. }
            | Behavior::GoesWrong { trace, .. }
            | Behavior::Diverges { trace } => trace,
        }
    }
}

/// A run in progress, advanced one step at a time.
pub struct Execution<'g> {
    machine: Machine<'g>,
    /// `None` once a step has gone wrong.
    state: Option<State>,
    failure: Option<Stuck>,
    trace: Vec<Event>,
    steps: u64,
}

impl<'g> Execution<'g> {
    pub fn new(machine: Machine<'g>, initial: State) -> Self {
        Self {
            machine,
            state: Some(initial),
            failure: None,
            trace: Vec::new(),
            steps: 0,
        }
    }

    /// Current state, or `None` after the run went wrong.
    pub fn state(&self) -> Option<&State> {
        self.state.as_ref()
    }

    pub fn machine(&self) -> &Machine<'g> {
        &self.machine
    }

    /// Call-stack depth of the current state.
    pub fn depth(&self) -> Option<usize> {
        self.state.as_ref().map(State::depth)
    }

    /// Every event recorded so far.
    pub fn trace(&self) -> &[Event] {
        &self.trace
    }

    /// Steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_final(&self) -> bool {
        self.state.as_ref().is_some_and(State::is_final)
    }

    /// Whether the next step calls an external function.
    pub fn at_external_step(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| self.machine.is_external_step(s))
    }

    /// Take one step, returning the events it produced.
    ///
    /// # Errors
    ///
    /// Returns the reason the run is stuck. Once a step fails every later
    /// call fails with the same reason.
    pub fn step(&mut self) -> Result<&[Event], Stuck> {
        if let Some(reason) = &self.failure {
            return Err(reason.clone());
        }
        let state = match self.state.take() {
            Some(s) if s.is_final() => {
                self.state = Some(s);
                return Err(Stuck::Finished);
            }
            Some(s) => s,
            None => return Err(Stuck::Finished),
        };
        match self.machine.step(state) {
            Ok(t) => {
                self.steps += 1;
                self.state = Some(t.state);
                let start = self.trace.len();
                self.trace.extend(t.events);
                Ok(&self.trace[start..])
            }
            Err(reason) => {
                self.failure = Some(reason.clone());
                Err(reason)
            }
        }
    }

    /// Exit code once the entry point has returned.
    pub fn exit_code(&self) -> Result<Option<i32>, Stuck> {
        match &self.state {
            Some(s) => self.machine.exit_code(s),
            None => Ok(None),
        }
    }

    /// Run until termination, a stuck state, or `fuel` more steps.
    pub fn run(mut self, fuel: u64) -> Behavior {
        let mut remaining = fuel;
        let behavior = loop {
            match self.exit_code() {
                Ok(Some(code)) => {
                    break Behavior::Terminates {
                        trace: self.trace,
                        code,
                    }
                }
                Err(reason) => {
                    break Behavior::GoesWrong {
                        trace: self.trace,
                        reason,
                    }
                }
                Ok(None) => {}
            }
            if remaining == 0 {
                break Behavior::Diverges { trace: self.trace };
            }
            remaining -= 1;
            let stepped = self.step().map(|_| ());
            if let Err(reason) = stepped {
                break Behavior::GoesWrong {
                    trace: self.trace,
                    reason,
                };
            }
        };
        match &behavior {
            Behavior::Terminates { code, .. } => info!(code, "program terminated"),
            Behavior::GoesWrong { reason, .. } => info!(%reason, "program went wrong"),
            Behavior::Diverges { .. } => info!(fuel, "fuel exhausted"),
        }
        behavior
    }
}

/// Load `program` and run it with the default oracle and host primitives.
pub fn run(program: &Program, config: &RunConfig) -> Result<Behavior, LoadError> {
    let (genv, mem) = Genv::load(program)?;
    let machine = Machine::new(&genv, config.convention.clone());
    let initial = machine.initial_state(&program.entry, mem)?;
    info!(entry = %program.entry, fuel = config.fuel, "starting program");
    Ok(Execution::new(machine, initial).run(config.fuel))
}
