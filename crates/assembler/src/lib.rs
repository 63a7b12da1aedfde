//! Mach assembler — textual Mach programs.
//!
//! One directive or instruction per line, `;` comments, keywords in any case:
//!
//! ```text
//! entry main
//! var counter int32 0
//! extern print_int (int) -> int
//! func main () -> int frame 8 stack 0 link 0 retaddr 1
//!   op r0 intconst 42
//!   return
//! end
//! ```
//!
//! # Usage
//!
//! ```
//! use mach_assembler::{assemble, disassemble};
//!
//! let text = "func main () -> int frame 8 stack 0 link 0 retaddr 1\n  op r0 intconst 42\n  return\nend\n";
//! let program = assemble(text).unwrap();
//! assert_eq!(program.functions().count(), 1);
//! assert_eq!(assemble(&disassemble(&program)).unwrap(), program);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `assemble(disassemble(program)) == program` for every program the
//! assembler produces. The disassembler outputs canonical text; the
//! assembler also accepts non-canonical input (hex numbers, upper case,
//! extra spacing, comments).

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use error::AsmError;

use lexer::tokenize_line;
use mach_common::{ExternalFunction, FunDef, Function, Global, Program};
use parser::{parse_line, Item};

/// A function whose `end` has not been seen yet.
struct OpenFunction {
    name: String,
    line: usize,
    function: Function,
}

/// Assemble text into a program.
///
/// Returns the first error encountered. Fix one error at a time.
pub fn assemble(text: &str) -> Result<Program, AsmError> {
    let mut program = Program::new();
    let mut open: Option<OpenFunction> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line, line_num)?;
        let Some(item) = parse_line(&tokens, line_num)? else {
            continue;
        };

        if let Some(mut f) = open.take() {
            match item {
                Item::Instr(instr) => {
                    f.function.code.push(instr);
                    open = Some(f);
                }
                Item::End => program
                    .globals
                    .push((f.name, Global::Fun(FunDef::Internal(f.function)))),
                _ => {
                    return Err(AsmError::InsideFunction {
                        line: line_num,
                        name: f.name,
                    })
                }
            }
            continue;
        }

        match item {
            Item::Entry(name) => program.entry = name,
            Item::Var(name, var) => program.globals.push((name, Global::Var(var))),
            Item::Extern(name, sig) => {
                let ef = ExternalFunction {
                    name: name.clone(),
                    sig,
                };
                program.globals.push((name, Global::Fun(FunDef::External(ef))));
            }
            Item::Func(name, function) => {
                open = Some(OpenFunction {
                    name,
                    line: line_num,
                    function,
                })
            }
            Item::End => {
                return Err(AsmError::UnexpectedToken {
                    line: line_num,
                    token: "end".to_string(),
                })
            }
            Item::Instr(_) => return Err(AsmError::OutsideFunction { line: line_num }),
        }
    }

    match open {
        Some(f) => Err(AsmError::UnterminatedFunction {
            line: f.line,
            name: f.name,
        }),
        None => Ok(program),
    }
}

/// Disassemble a program into canonical assembly text.
pub fn disassemble(program: &Program) -> String {
    disassembler::disassemble(program)
}
