//! Parser for Mach assembly tokens → directives and instructions.
//!
//! Each line is parsed on its own. Grouping instructions into the function
//! opened by the preceding `func` line happens in [`crate::assemble`].

use crate::error::AsmError;
use crate::lexer::Token;
use mach_common::{
    Addressing, Callee, Chunk, Comparison, Condition, Function, GlobalVar, InitData, Instruction,
    MReg, NameError, Operation, Signature, Ty,
};

/// Result of parsing a single assembly line.
#[derive(Debug)]
pub(crate) enum Item {
    /// `entry NAME`
    Entry(String),
    /// `var NAME INIT..`
    Var(String, GlobalVar),
    /// `extern NAME SIG`
    Extern(String, Signature),
    /// `func NAME SIG frame N stack N link N retaddr N`, with empty code.
    Func(String, Function),
    /// `end` closing a function.
    End,
    Instr(Instruction),
}

/// Walks the tokens of one line.
struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token], line: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            line,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self, expected: &'static str) -> Result<&'a Token, AsmError> {
        let tok = self.tokens.get(self.pos).ok_or(AsmError::MissingArgument {
            line: self.line,
            expected,
        })?;
        self.pos += 1;
        Ok(tok)
    }

    fn unexpected(&self, tok: &Token) -> AsmError {
        AsmError::UnexpectedToken {
            line: self.line,
            token: tok.to_string(),
        }
    }

    fn bad_name(&self, source: NameError) -> AsmError {
        AsmError::BadName {
            line: self.line,
            source,
        }
    }

    fn word(&mut self, expected: &'static str) -> Result<&'a str, AsmError> {
        match self.next(expected)? {
            Token::Word(w) => Ok(w),
            tok => Err(self.unexpected(tok)),
        }
    }

    /// A bare word compared case-insensitively against `kw`.
    fn keyword(&mut self, kw: &'static str) -> Result<(), AsmError> {
        match self.next(kw)? {
            Token::Word(w) if w.eq_ignore_ascii_case(kw) => Ok(()),
            tok => Err(self.unexpected(tok)),
        }
    }

    fn punct(&mut self, expected: &'static str, want: Token) -> Result<(), AsmError> {
        let tok = self.next(expected)?;
        if *tok == want {
            Ok(())
        } else {
            Err(self.unexpected(tok))
        }
    }

    fn int<T: TryFrom<i64>>(&mut self, expected: &'static str) -> Result<T, AsmError> {
        match self.next(expected)? {
            Token::Int(n) => T::try_from(*n).map_err(|_| AsmError::InvalidNumber {
                line: self.line,
                token: n.to_string(),
            }),
            tok => Err(self.unexpected(tok)),
        }
    }

    fn i32(&mut self, expected: &'static str) -> Result<i32, AsmError> {
        self.int(expected)
    }

    fn label(&mut self) -> Result<u32, AsmError> {
        self.int("label")
    }

    /// A float literal. Integers are accepted, and so are the words
    /// `inf`, `-inf` and `NaN`.
    fn float(&mut self) -> Result<f64, AsmError> {
        match self.next("float")? {
            Token::Float(x) => Ok(*x),
            Token::Int(n) => Ok(*n as f64),
            Token::Word(w) => w.parse().map_err(|_| AsmError::InvalidNumber {
                line: self.line,
                token: w.clone(),
            }),
            tok => Err(self.unexpected(tok)),
        }
    }

    fn reg(&mut self) -> Result<MReg, AsmError> {
        let w = self.word("register")?;
        w.parse().map_err(|e| self.bad_name(e))
    }

    fn ty(&mut self) -> Result<Ty, AsmError> {
        let w = self.word("type")?;
        w.parse().map_err(|e| self.bad_name(e))
    }

    fn chunk(&mut self) -> Result<Chunk, AsmError> {
        let w = self.word("memory chunk")?;
        w.parse().map_err(|e| self.bad_name(e))
    }

    fn comparison(&mut self) -> Result<Comparison, AsmError> {
        let w = self.word("comparison")?;
        w.parse().map_err(|e| self.bad_name(e))
    }

    /// Registers up to the end of the line.
    fn regs(&mut self) -> Result<Vec<MReg>, AsmError> {
        let mut regs = Vec::new();
        while self.peek().is_some() {
            regs.push(self.reg()?);
        }
        Ok(regs)
    }

    fn end(&self) -> Result<(), AsmError> {
        match self.peek() {
            None => Ok(()),
            Some(tok) => Err(self.unexpected(tok)),
        }
    }

    fn signature(&mut self) -> Result<Signature, AsmError> {
        self.punct("'('", Token::LParen)?;
        let mut args = Vec::new();
        while self.peek() != Some(&Token::RParen) {
            args.push(self.ty()?);
        }
        self.pos += 1;
        let result = if self.peek() == Some(&Token::Arrow) {
            self.pos += 1;
            Some(self.ty()?)
        } else {
            None
        };
        Ok(Signature::new(args, result))
    }

    fn callee(&mut self) -> Result<Callee, AsmError> {
        let w = self.word("call target")?;
        Ok(match w.parse::<MReg>() {
            Ok(r) => Callee::Reg(r),
            Err(_) => Callee::Symbol(w.to_string()),
        })
    }

    /// `KIND CMP [IMM]`, e.g. `cmpimm lt 10` or `cmpf eq`.
    fn condition(&mut self) -> Result<Condition, AsmError> {
        let kind = self.word("condition")?.to_ascii_lowercase();
        let c = self.comparison()?;
        Ok(match kind.as_str() {
            "cmp" => Condition::Comp(c),
            "cmpu" => Condition::CompU(c),
            "cmpimm" => Condition::CompImm(c, self.i32("immediate")?),
            "cmpuimm" => Condition::CompUImm(c, self.i32("immediate")?),
            "cmpf" => Condition::CompF(c),
            "notcmpf" => Condition::NotCompF(c),
            _ => {
                return Err(AsmError::UnknownCondition {
                    line: self.line,
                    token: kind,
                })
            }
        })
    }

    /// An operation name followed by its immediates.
    fn operation(&mut self) -> Result<Operation, AsmError> {
        let name = self.word("operation")?.to_ascii_lowercase();
        Ok(match name.as_str() {
            "move" => Operation::Move,
            "intconst" => Operation::IntConst(self.i32("immediate")?),
            "floatconst" => Operation::FloatConst(self.float()?),
            "addrsymbol" => {
                let sym = self.word("symbol")?.to_string();
                Operation::AddrSymbol(sym, self.i32("offset")?)
            }
            "addrstack" => Operation::AddrStack(self.i32("offset")?),
            "cast8signed" => Operation::Cast8Signed,
            "cast8unsigned" => Operation::Cast8Unsigned,
            "cast16signed" => Operation::Cast16Signed,
            "cast16unsigned" => Operation::Cast16Unsigned,
            "add" => Operation::Add,
            "addimm" => Operation::AddImm(self.i32("immediate")?),
            "sub" => Operation::Sub,
            "rsubimm" => Operation::RsubImm(self.i32("immediate")?),
            "mul" => Operation::Mul,
            "mulimm" => Operation::MulImm(self.i32("immediate")?),
            "divs" => Operation::Divs,
            "divu" => Operation::Divu,
            "mods" => Operation::Mods,
            "modu" => Operation::Modu,
            "and" => Operation::And,
            "andimm" => Operation::AndImm(self.i32("immediate")?),
            "or" => Operation::Or,
            "orimm" => Operation::OrImm(self.i32("immediate")?),
            "xor" => Operation::Xor,
            "xorimm" => Operation::XorImm(self.i32("immediate")?),
            "shl" => Operation::Shl,
            "shlimm" => Operation::ShlImm(self.i32("immediate")?),
            "shr" => Operation::Shr,
            "shrimm" => Operation::ShrImm(self.i32("immediate")?),
            "shru" => Operation::Shru,
            "shruimm" => Operation::ShruImm(self.i32("immediate")?),
            "neg" => Operation::Neg,
            "not" => Operation::Not,
            "negf" => Operation::NegF,
            "absf" => Operation::AbsF,
            "addf" => Operation::AddF,
            "subf" => Operation::SubF,
            "mulf" => Operation::MulF,
            "divf" => Operation::DivF,
            "singleoffloat" => Operation::SingleOfFloat,
            "intoffloat" => Operation::IntOfFloat,
            "floatofint" => Operation::FloatOfInt,
            "floatofintu" => Operation::FloatOfIntU,
            "cmp" => Operation::Cmp(self.condition()?),
            _ => {
                return Err(AsmError::UnknownOperation {
                    line: self.line,
                    token: name,
                })
            }
        })
    }

    /// An addressing mode followed by its immediates.
    fn addressing(&mut self) -> Result<Addressing, AsmError> {
        let mode = self.word("addressing mode")?.to_ascii_lowercase();
        Ok(match mode.as_str() {
            "indexed" => Addressing::Indexed(self.i32("offset")?),
            "indexed2" => Addressing::Indexed2,
            "global" => {
                let sym = self.word("symbol")?.to_string();
                Addressing::Global(sym, self.i32("offset")?)
            }
            "based" => {
                let sym = self.word("symbol")?.to_string();
                Addressing::Based(sym, self.i32("offset")?)
            }
            "stack" => Addressing::Stack(self.i32("offset")?),
            _ => {
                return Err(AsmError::UnknownAddressing {
                    line: self.line,
                    token: mode,
                })
            }
        })
    }

    fn init_data(&mut self) -> Result<InitData, AsmError> {
        let kind = self.word("initializer")?.to_ascii_lowercase();
        Ok(match kind.as_str() {
            "int8" => InitData::Int8(self.i32("value")?),
            "int16" => InitData::Int16(self.i32("value")?),
            "int32" => InitData::Int32(self.i32("value")?),
            "float32" => InitData::Float32(self.float()?),
            "float64" => InitData::Float64(self.float()?),
            "space" => InitData::Space(self.int("size")?),
            "addr" => {
                let sym = self.word("symbol")?.to_string();
                InitData::Addr(sym, self.i32("offset")?)
            }
            _ => {
                return Err(AsmError::UnknownInit {
                    line: self.line,
                    token: kind,
                })
            }
        })
    }
}

/// Parse the tokens of one line.
///
/// Returns `Ok(None)` for blank lines (empty token list).
pub(crate) fn parse_line(tokens: &[Token], line_num: usize) -> Result<Option<Item>, AsmError> {
    let mut c = Cursor::new(tokens, line_num);
    let Some(first) = c.peek() else {
        return Ok(None);
    };
    let mnemonic = match first {
        Token::Word(w) => w.to_ascii_lowercase(),
        tok => return Err(c.unexpected(tok)),
    };
    c.pos += 1;

    let item = match mnemonic.as_str() {
        "entry" => Item::Entry(c.word("symbol")?.to_string()),
        "var" => {
            let name = c.word("symbol")?.to_string();
            let mut init = Vec::new();
            while c.peek().is_some() {
                init.push(c.init_data()?);
            }
            Item::Var(name, GlobalVar::new(init))
        }
        "extern" => {
            let name = c.word("symbol")?.to_string();
            Item::Extern(name, c.signature()?)
        }
        "func" => {
            let name = c.word("symbol")?.to_string();
            let sig = c.signature()?;
            c.keyword("frame")?;
            let frame_size = c.i32("frame size")?;
            c.keyword("stack")?;
            let stack_size = c.i32("stack size")?;
            c.keyword("link")?;
            let link_ofs = c.i32("link slot")?;
            c.keyword("retaddr")?;
            let retaddr_ofs = c.i32("return-address slot")?;
            Item::Func(
                name,
                Function {
                    sig,
                    code: Vec::new(),
                    frame_size,
                    stack_size,
                    link_ofs,
                    retaddr_ofs,
                },
            )
        }
        "end" => Item::End,
        _ => Item::Instr(parse_instruction(&mnemonic, &mut c)?),
    };
    c.end()?;
    Ok(Some(item))
}

fn parse_instruction(mnemonic: &str, c: &mut Cursor<'_>) -> Result<Instruction, AsmError> {
    Ok(match mnemonic {
        "label" => Instruction::Label(c.label()?),
        "getstack" => {
            let ofs = c.i32("slot offset")?;
            let ty = c.ty()?;
            Instruction::GetStack {
                ofs,
                ty,
                dst: c.reg()?,
            }
        }
        "setstack" => {
            let src = c.reg()?;
            let ofs = c.i32("slot offset")?;
            Instruction::SetStack {
                src,
                ofs,
                ty: c.ty()?,
            }
        }
        "getparam" => {
            let ofs = c.i32("slot offset")?;
            let ty = c.ty()?;
            Instruction::GetParam {
                ofs,
                ty,
                dst: c.reg()?,
            }
        }
        "op" => {
            let dst = c.reg()?;
            let op = c.operation()?;
            Instruction::Op {
                op,
                args: c.regs()?,
                dst,
            }
        }
        "load" => {
            let chunk = c.chunk()?;
            let dst = c.reg()?;
            let addr = c.addressing()?;
            Instruction::Load {
                chunk,
                addr,
                args: c.regs()?,
                dst,
            }
        }
        "store" => {
            let chunk = c.chunk()?;
            let src = c.reg()?;
            let addr = c.addressing()?;
            Instruction::Store {
                chunk,
                addr,
                args: c.regs()?,
                src,
            }
        }
        "call" => Instruction::Call(c.callee()?),
        "tailcall" => Instruction::TailCall(c.callee()?),
        "goto" => Instruction::Goto(c.label()?),
        "cond" => {
            let cond = c.condition()?;
            let mut args = Vec::new();
            while matches!(c.peek(), Some(Token::Word(_))) {
                args.push(c.reg()?);
            }
            Instruction::Cond {
                cond,
                args,
                target: c.label()?,
            }
        }
        "jumptable" => {
            let arg = c.reg()?;
            let mut targets = Vec::new();
            while c.peek().is_some() {
                targets.push(c.label()?);
            }
            Instruction::JumpTable { arg, targets }
        }
        "return" => Instruction::Return,
        _ => {
            return Err(AsmError::UnknownMnemonic {
                line: c.line,
                token: mnemonic.to_string(),
            })
        }
    })
}
