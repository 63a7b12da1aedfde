//! External calls and the observable trace.
//!
//! An external function is a primitive the machine cannot see into. Its
//! effect is a result value plus zero or more events. The interface may
//! relate one argument list to several outcomes; [`ExternalCalls`] is how a
//! caller picks one.

use mach_common::{ExternalFunction, Ty, Value};
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// A value that can appear in the trace. Pointers and undefined values
/// never cross the external boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventVal {
    Int(i32),
    Float(f64),
}

impl EventVal {
    /// The event form of a machine value, if it has one.
    pub fn of_value(v: Value) -> Option<EventVal> {
        match v {
            Value::Int(n) => Some(EventVal::Int(n)),
            Value::Float(x) => Some(EventVal::Float(x)),
            Value::Ptr { .. } | Value::Undef => None,
        }
    }

    pub fn to_value(self) -> Value {
        match self {
            EventVal::Int(n) => Value::Int(n),
            EventVal::Float(x) => Value::Float(x),
        }
    }
}

impl fmt::Display for EventVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_value().fmt(f)
    }
}

/// One observable interaction with the outside world.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub args: Vec<EventVal>,
    pub result: EventVal,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, a) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{a}")?;
        }
        write!(f, ") = {}", self.result)
    }
}

/// Result of one external call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalOutcome {
    pub result: Value,
    pub events: Vec<Event>,
}

impl ExternalOutcome {
    /// Outcome of a call that produced exactly one event recording itself.
    pub fn observed(ef: &ExternalFunction, args: &[EventVal], result: EventVal) -> Self {
        Self {
            result: result.to_value(),
            events: vec![Event {
                name: ef.name.clone(),
                args: args.to_vec(),
                result,
            }],
        }
    }

    /// Outcome of a call with no observable effect.
    pub fn silent(result: Value) -> Self {
        Self {
            result,
            events: Vec::new(),
        }
    }
}

/// The external call interface.
pub trait ExternalCalls {
    /// Perform `ef` on `args`. `None` when the call has no outcome for these
    /// arguments, which leaves the machine stuck.
    fn call(&mut self, ef: &ExternalFunction, args: &[Value]) -> Option<ExternalOutcome>;
}

/// Converts arguments to event values, checking them against the signature.
fn event_args(ef: &ExternalFunction, args: &[Value]) -> Option<Vec<EventVal>> {
    if args.len() != ef.sig.args.len() {
        return None;
    }
    args.iter()
        .zip(&ef.sig.args)
        .map(|(&v, &ty)| {
            let ev = EventVal::of_value(v)?;
            match (ev, ty) {
                (EventVal::Int(_), Ty::Int) | (EventVal::Float(_), Ty::Float) => Some(ev),
                _ => None,
            }
        })
        .collect()
}

/// A small set of host primitives.
///
/// | name          | signature          | result   | event |
/// |---------------|--------------------|----------|-------|
/// | `print_int`   | `(int) -> int`     | 0        | yes   |
/// | `print_float` | `(float) -> int`   | 0        | yes   |
/// | `putchar`     | `(int) -> int`     | the char | yes   |
/// | `abs`         | `(int) -> int`     | \|n\|    | no    |
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPrimitives;

impl ExternalCalls for HostPrimitives {
    fn call(&mut self, ef: &ExternalFunction, args: &[Value]) -> Option<ExternalOutcome> {
        let evs = event_args(ef, args)?;
        let outcome = match (ef.name.as_str(), evs.as_slice()) {
            ("print_int", [EventVal::Int(_)]) | ("print_float", [EventVal::Float(_)]) => {
                ExternalOutcome::observed(ef, &evs, EventVal::Int(0))
            }
            ("putchar", [EventVal::Int(c)]) => {
                ExternalOutcome::observed(ef, &evs, EventVal::Int(*c))
            }
            ("abs", [EventVal::Int(n)]) => ExternalOutcome::silent(Value::Int(n.wrapping_abs())),
            _ => return None,
        };
        debug!(name = %ef.name, result = %outcome.result, "host primitive");
        Some(outcome)
    }
}

/// Replays a fixed sequence of results, one per call, recording each call
/// as an event. Runs out after the last one.
#[derive(Debug, Clone, Default)]
pub struct ScriptedExternals {
    results: VecDeque<EventVal>,
}

impl ScriptedExternals {
    pub fn new(results: impl IntoIterator<Item = EventVal>) -> Self {
        Self {
            results: results.into_iter().collect(),
        }
    }

    /// Results not yet consumed.
    pub fn remaining(&self) -> usize {
        self.results.len()
    }
}

impl ExternalCalls for ScriptedExternals {
    fn call(&mut self, ef: &ExternalFunction, args: &[Value]) -> Option<ExternalOutcome> {
        let evs = event_args(ef, args)?;
        let result = self.results.pop_front()?;
        Some(ExternalOutcome::observed(ef, &evs, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mach_common::Signature;

    fn ext(name: &str, args: Vec<Ty>) -> ExternalFunction {
        ExternalFunction {
            name: name.to_string(),
            sig: Signature::new(args, Some(Ty::Int)),
        }
    }

    #[test]
    fn print_int_records_event() {
        let ef = ext("print_int", vec![Ty::Int]);
        let out = HostPrimitives.call(&ef, &[Value::Int(7)]).unwrap();
        assert_eq!(out.result, Value::Int(0));
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.events[0].to_string(), "print_int(7) = 0");
    }

    #[test]
    fn putchar_returns_char() {
        let ef = ext("putchar", vec![Ty::Int]);
        let out = HostPrimitives.call(&ef, &[Value::Int(65)]).unwrap();
        assert_eq!(out.result, Value::Int(65));
    }

    #[test]
    fn abs_is_silent() {
        let ef = ext("abs", vec![Ty::Int]);
        let out = HostPrimitives.call(&ef, &[Value::Int(-5)]).unwrap();
        assert_eq!(out, ExternalOutcome::silent(Value::Int(5)));
    }

    #[test]
    fn pointers_do_not_cross_the_boundary() {
        let ef = ext("print_int", vec![Ty::Int]);
        assert!(HostPrimitives.call(&ef, &[Value::ptr(1, 0)]).is_none());
        assert!(HostPrimitives.call(&ef, &[Value::Undef]).is_none());
    }

    #[test]
    fn argument_kinds_must_match_signature() {
        let ef = ext("print_float", vec![Ty::Float]);
        assert!(HostPrimitives.call(&ef, &[Value::Int(1)]).is_none());
        assert!(HostPrimitives.call(&ef, &[Value::Float(1.5)]).is_some());
        assert!(HostPrimitives.call(&ef, &[]).is_none());
    }

    #[test]
    fn unknown_primitive_has_no_outcome() {
        let ef = ext("launch_rockets", vec![]);
        assert!(HostPrimitives.call(&ef, &[]).is_none());
    }

    #[test]
    fn scripted_results_in_order() {
        let ef = ext("read", vec![]);
        let mut script = ScriptedExternals::new([EventVal::Int(1), EventVal::Int(2)]);
        assert_eq!(script.call(&ef, &[]).unwrap().result, Value::Int(1));
        assert_eq!(script.remaining(), 1);
        assert_eq!(script.call(&ef, &[]).unwrap().result, Value::Int(2));
        assert!(script.call(&ef, &[]).is_none());
    }

    #[test]
    fn event_display() {
        let e = Event {
            name: "f".to_string(),
            args: vec![EventVal::Int(1), EventVal::Float(2.5)],
            result: EventVal::Int(0),
        };
        assert_eq!(e.to_string(), "f(1, 2.5) = 0");
    }
}
