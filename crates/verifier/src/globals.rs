//! Global checks: symbol uniqueness, the entry point, and symbol references.

use crate::error::VerifyError;
use mach_common::{Callee, FunDef, Global, InitData, Instruction, Program, Signature};
use std::collections::HashMap;

/// Run the globals check.
pub fn check_globals(program: &Program) -> Vec<VerifyError> {
    let mut errors = Vec::new();
    let mut kinds: HashMap<&str, bool> = HashMap::new();

    for (name, global) in &program.globals {
        let is_fun = matches!(global, Global::Fun(_));
        if kinds.insert(name.as_str(), is_fun).is_some() {
            errors.push(VerifyError::DuplicateSymbol { name: name.clone() });
        }
    }

    match program.global(&program.entry) {
        None => errors.push(VerifyError::MissingEntry {
            name: program.entry.clone(),
        }),
        Some(Global::Fun(FunDef::Internal(f))) => {
            if f.sig != Signature::main() {
                errors.push(VerifyError::BadEntrySignature {
                    name: program.entry.clone(),
                    sig: f.sig.to_string(),
                });
            }
        }
        Some(_) => errors.push(VerifyError::EntryNotInternal {
            name: program.entry.clone(),
        }),
    }

    for (var, global) in &program.globals {
        if let Global::Var(v) = global {
            for item in &v.init {
                if let InitData::Addr(name, _) = item {
                    if !kinds.contains_key(name.as_str()) {
                        errors.push(VerifyError::UnknownInitSymbol {
                            var: var.clone(),
                            name: name.clone(),
                        });
                    }
                }
            }
        }
    }

    for (func, f) in program.functions() {
        for (at, instr) in f.code.iter().enumerate() {
            for (name, called) in references(instr) {
                match kinds.get(name) {
                    None => errors.push(VerifyError::UnknownSymbol {
                        func: func.to_string(),
                        at,
                        name: name.to_string(),
                    }),
                    Some(false) if called => errors.push(VerifyError::CallToVariable {
                        func: func.to_string(),
                        at,
                        name: name.to_string(),
                    }),
                    Some(_) => {}
                }
            }
        }
    }

    errors
}

/// Symbols an instruction mentions, with whether it calls them.
fn references(instr: &Instruction) -> Vec<(&str, bool)> {
    match instr {
        Instruction::Call(Callee::Symbol(s)) | Instruction::TailCall(Callee::Symbol(s)) => {
            vec![(s.as_str(), true)]
        }
        Instruction::Op { op, .. } => op.symbol().map(|s| (s, false)).into_iter().collect(),
        Instruction::Load { addr, .. } | Instruction::Store { addr, .. } => {
            addr.symbol().map(|s| (s, false)).into_iter().collect()
        }
        _ => Vec::new(),
    }
}
