//! Disassembler: program → canonical assembly text.
//!
//! The output starts with the `entry` line, then one directive per global in
//! declaration order. Instructions are indented by two spaces, functions are
//! preceded by a blank line, and there are no comments. Floats are written
//! in their shortest exact form.

use mach_common::{
    Addressing, Condition, FunDef, Function, Global, GlobalVar, InitData, Instruction, MReg,
    Operation, Program,
};

/// Disassemble a program into canonical assembly text.
///
/// The output reassembles to an identical program
/// (`assemble(disassemble(program)) == program`) whenever every external
/// function is declared under its own name and no symbol is spelled like a
/// register.
pub fn disassemble(program: &Program) -> String {
    let mut lines = vec![format!("entry {}", program.entry)];
    for (name, global) in &program.globals {
        match global {
            Global::Var(v) => lines.push(var_line(name, v)),
            Global::Fun(FunDef::External(ef)) => lines.push(format!("extern {name} {}", ef.sig)),
            Global::Fun(FunDef::Internal(f)) => {
                lines.push(String::new());
                function_lines(name, f, &mut lines);
            }
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn var_line(name: &str, v: &GlobalVar) -> String {
    let mut line = format!("var {name}");
    for item in &v.init {
        line.push(' ');
        line.push_str(&match item {
            InitData::Int8(n) => format!("int8 {n}"),
            InitData::Int16(n) => format!("int16 {n}"),
            InitData::Int32(n) => format!("int32 {n}"),
            InitData::Float32(x) => format!("float32 {x:?}"),
            InitData::Float64(x) => format!("float64 {x:?}"),
            InitData::Space(n) => format!("space {n}"),
            InitData::Addr(sym, ofs) => format!("addr {sym} {ofs}"),
        });
    }
    line
}

fn function_lines(name: &str, f: &Function, lines: &mut Vec<String>) {
    lines.push(format!(
        "func {name} {} frame {} stack {} link {} retaddr {}",
        f.sig, f.frame_size, f.stack_size, f.link_ofs, f.retaddr_ofs
    ));
    for instr in &f.code {
        lines.push(format!("  {}", instruction_text(instr)));
    }
    lines.push("end".to_string());
}

fn join_regs(prefix: String, regs: &[MReg]) -> String {
    regs.iter().fold(prefix, |mut s, r| {
        s.push(' ');
        s.push_str(&r.to_string());
        s
    })
}

fn condition_text(cond: &Condition) -> String {
    match cond {
        Condition::Comp(c)
        | Condition::CompU(c)
        | Condition::CompF(c)
        | Condition::NotCompF(c) => format!("{} {}", cond.mnemonic(), c.name()),
        Condition::CompImm(c, n) | Condition::CompUImm(c, n) => {
            format!("{} {} {n}", cond.mnemonic(), c.name())
        }
    }
}

fn operation_text(op: &Operation) -> String {
    let name = op.mnemonic();
    match op {
        Operation::IntConst(n)
        | Operation::AddrStack(n)
        | Operation::AddImm(n)
        | Operation::RsubImm(n)
        | Operation::MulImm(n)
        | Operation::AndImm(n)
        | Operation::OrImm(n)
        | Operation::XorImm(n)
        | Operation::ShlImm(n)
        | Operation::ShrImm(n)
        | Operation::ShruImm(n) => format!("{name} {n}"),
        Operation::FloatConst(x) => format!("{name} {x:?}"),
        Operation::AddrSymbol(sym, n) => format!("{name} {sym} {n}"),
        Operation::Cmp(cond) => format!("{name} {}", condition_text(cond)),
        _ => name.to_string(),
    }
}

fn addressing_text(addr: &Addressing) -> String {
    let name = addr.mnemonic();
    match addr {
        Addressing::Indexed(n) | Addressing::Stack(n) => format!("{name} {n}"),
        Addressing::Global(sym, n) | Addressing::Based(sym, n) => format!("{name} {sym} {n}"),
        Addressing::Indexed2 => name.to_string(),
    }
}

/// Canonical text of one instruction, without indentation.
pub(crate) fn instruction_text(instr: &Instruction) -> String {
    let m = instr.mnemonic();
    match instr {
        Instruction::Label(l) | Instruction::Goto(l) => format!("{m} {l}"),
        Instruction::GetStack { ofs, ty, dst } | Instruction::GetParam { ofs, ty, dst } => {
            format!("{m} {ofs} {} {dst}", ty.name())
        }
        Instruction::SetStack { src, ofs, ty } => format!("{m} {src} {ofs} {}", ty.name()),
        Instruction::Op { op, args, dst } => {
            join_regs(format!("{m} {dst} {}", operation_text(op)), args)
        }
        Instruction::Load {
            chunk,
            addr,
            args,
            dst,
        } => join_regs(
            format!("{m} {} {dst} {}", chunk.name(), addressing_text(addr)),
            args,
        ),
        Instruction::Store {
            chunk,
            addr,
            args,
            src,
        } => join_regs(
            format!("{m} {} {src} {}", chunk.name(), addressing_text(addr)),
            args,
        ),
        Instruction::Call(callee) | Instruction::TailCall(callee) => format!("{m} {callee}"),
        Instruction::Cond { cond, args, target } => {
            format!("{} {target}", join_regs(format!("{m} {}", condition_text(cond)), args))
        }
        Instruction::JumpTable { arg, targets } => {
            targets
                .iter()
                .fold(format!("{m} {arg}"), |s, t| format!("{s} {t}"))
        }
        Instruction::Return => m.to_string(),
    }
}
