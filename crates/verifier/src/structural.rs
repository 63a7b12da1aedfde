//! Structural checks: labels and function ends.

use crate::error::VerifyError;
use mach_common::{Function, Instruction, Program};
use std::collections::HashSet;

/// Run the structural check on every internal function.
pub fn check_structural(program: &Program) -> Vec<VerifyError> {
    program
        .functions()
        .flat_map(|(name, f)| check_function(name, f))
        .collect()
}

fn check_function(name: &str, f: &Function) -> Vec<VerifyError> {
    let mut errors = Vec::new();
    let mut labels = HashSet::new();

    for (at, instr) in f.code.iter().enumerate() {
        if let Instruction::Label(l) = instr {
            if !labels.insert(*l) {
                errors.push(VerifyError::DuplicateLabel {
                    func: name.to_string(),
                    at,
                    label: *l,
                });
            }
        }
    }

    for (at, instr) in f.code.iter().enumerate() {
        for label in instr.branch_targets() {
            if !labels.contains(&label) {
                errors.push(VerifyError::UndefinedLabel {
                    func: name.to_string(),
                    at,
                    label,
                });
            }
        }
    }

    if !f.code.last().is_some_and(Instruction::ends_block) {
        errors.push(VerifyError::FallsOffEnd {
            func: name.to_string(),
        });
    }

    errors
}
