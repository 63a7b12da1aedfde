//! Whole programs: functions, external primitives and global variables.

use crate::chunk::Ty;
use crate::instruction::Instruction;

/// Argument and result types of a function.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub args: Vec<Ty>,
    /// `None` for functions returning nothing.
    pub result: Option<Ty>,
}

impl Signature {
    pub fn new(args: Vec<Ty>, result: Option<Ty>) -> Self {
        Self { args, result }
    }

    /// The signature of a program entry point: no arguments, integer result.
    pub fn main() -> Self {
        Self::new(Vec::new(), Some(Ty::Int))
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let args: Vec<&str> = self.args.iter().map(|t| t.name()).collect();
        write!(f, "({})", args.join(" "))?;
        if let Some(r) = self.result {
            write!(f, " -> {}", r.name())?;
        }
        Ok(())
    }
}

/// A function with code.
///
/// The frame occupies bytes `[-frame_size, stack_size)` of a fresh block and
/// the stack pointer points at `-frame_size`, so slot `k` lives at byte
/// `-frame_size + 4 * k`. `link_ofs` and `retaddr_ofs` are slot offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub sig: Signature,
    pub code: Vec<Instruction>,
    /// Bytes below the reference point: the frame proper.
    pub frame_size: i32,
    /// Bytes above the reference point: locals addressed with `addrstack`.
    pub stack_size: i32,
    /// Slot holding the caller's stack pointer.
    pub link_ofs: i32,
    /// Slot holding the caller's return address.
    pub retaddr_ofs: i32,
}

/// A primitive implemented outside the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFunction {
    pub name: String,
    pub sig: Signature,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunDef {
    Internal(Function),
    External(ExternalFunction),
}

impl FunDef {
    pub fn sig(&self) -> &Signature {
        match self {
            FunDef::Internal(f) => &f.sig,
            FunDef::External(ef) => &ef.sig,
        }
    }
}

/// One item of a global variable's initial contents.
#[derive(Debug, Clone, PartialEq)]
pub enum InitData {
    Int8(i32),
    Int16(i32),
    Int32(i32),
    Float32(f64),
    Float64(f64),
    /// Zero-filled bytes.
    Space(u32),
    /// Address of a symbol plus byte offset, stored as a 32-bit word.
    Addr(String, i32),
}

impl InitData {
    /// Size in bytes.
    pub fn size(&self) -> i64 {
        match self {
            InitData::Int8(_) => 1,
            InitData::Int16(_) => 2,
            InitData::Int32(_) | InitData::Float32(_) | InitData::Addr(..) => 4,
            InitData::Float64(_) => 8,
            InitData::Space(n) => i64::from(*n),
        }
    }
}

/// Largest global variable, in bytes, that a program may declare.
pub const MAX_VAR_SIZE: i32 = 1 << 24;

/// A global variable: a block initialized from `init`, laid out in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlobalVar {
    pub init: Vec<InitData>,
}

impl GlobalVar {
    pub fn new(init: Vec<InitData>) -> Self {
        Self { init }
    }

    /// Total size in bytes. Not bounded; see [`MAX_VAR_SIZE`].
    pub fn size(&self) -> i64 {
        self.init.iter().map(InitData::size).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Global {
    Fun(FunDef),
    Var(GlobalVar),
}

/// Default entry point symbol.
pub const DEFAULT_ENTRY: &str = "main";

/// A whole Mach program: named globals in declaration order and an entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub globals: Vec<(String, Global)>,
    pub entry: String,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    /// An empty program whose entry point is `main`.
    pub fn new() -> Self {
        Self {
            globals: Vec::new(),
            entry: DEFAULT_ENTRY.to_string(),
        }
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    pub fn add_function(mut self, name: impl Into<String>, f: Function) -> Self {
        self.globals
            .push((name.into(), Global::Fun(FunDef::Internal(f))));
        self
    }

    pub fn add_external(mut self, name: impl Into<String>, sig: Signature) -> Self {
        let name = name.into();
        self.globals.push((
            name.clone(),
            Global::Fun(FunDef::External(ExternalFunction { name, sig })),
        ));
        self
    }

    pub fn add_var(mut self, name: impl Into<String>, var: GlobalVar) -> Self {
        self.globals.push((name.into(), Global::Var(var)));
        self
    }

    /// Look up a global by name. The first definition wins.
    pub fn global(&self, name: &str) -> Option<&Global> {
        self.globals
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, g)| g)
    }

    /// Internal functions with their names, in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = (&str, &Function)> {
        self.globals.iter().filter_map(|(n, g)| match g {
            Global::Fun(FunDef::Internal(f)) => Some((n.as_str(), f)),
            _ => None,
        })
    }

    /// Number of globals.
    pub fn len(&self) -> usize {
        self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }
}
