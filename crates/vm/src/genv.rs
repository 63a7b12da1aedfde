//! Global environment and initial memory.
//!
//! Every global gets its own block, in declaration order. A function's
//! block is empty and serves only as the function's identity; a variable's
//! block holds its initial data. The environment is built once and never
//! mutated afterwards.

use crate::error::LoadError;
use mach_common::{Block, Chunk, FunDef, Global, InitData, Program, Value, MAX_VAR_SIZE};
use mach_memory::Mem;
use std::collections::HashMap;
use tracing::debug;

/// Immutable symbol table and function table.
#[derive(Debug, Clone)]
pub struct Genv {
    symbols: HashMap<String, Block>,
    names: HashMap<Block, String>,
    functions: HashMap<Block, FunDef>,
}

impl Genv {
    /// Build the environment and the initial memory image for `program`.
    pub fn load(program: &Program) -> Result<(Genv, Mem), LoadError> {
        let mut mem = Mem::new();
        let mut genv = Genv {
            symbols: HashMap::new(),
            names: HashMap::new(),
            functions: HashMap::new(),
        };

        for (name, global) in &program.globals {
            if genv.symbols.contains_key(name) {
                return Err(LoadError::DuplicateSymbol(name.clone()));
            }
            let block = match global {
                Global::Fun(fd) => {
                    let b = mem.alloc(0, 0);
                    genv.functions.insert(b, fd.clone());
                    b
                }
                Global::Var(var) => {
                    let size = var.size();
                    let hi = i32::try_from(size)
                        .ok()
                        .filter(|&hi| hi <= MAX_VAR_SIZE)
                        .ok_or_else(|| LoadError::VarTooLarge {
                            name: name.clone(),
                            size,
                            max: MAX_VAR_SIZE,
                        })?;
                    mem.alloc(0, hi)
                }
            };
            genv.symbols.insert(name.clone(), block);
            genv.names.insert(block, name.clone());
        }

        // Initializers may take the address of any global, so they run
        // only once every symbol has a block.
        for (name, global) in &program.globals {
            if let Global::Var(var) = global {
                let block = genv.symbols[name];
                // Offsets stay within MAX_VAR_SIZE, checked above.
                let mut ofs = 0;
                for item in &var.init {
                    genv.store_init(&mut mem, block, ofs, item)?;
                    ofs += item.size() as i32;
                }
            }
        }

        debug!(
            globals = program.globals.len(),
            functions = genv.functions.len(),
            "global environment loaded"
        );
        Ok((genv, mem))
    }

    fn store_init(
        &self,
        mem: &mut Mem,
        block: Block,
        ofs: i32,
        item: &InitData,
    ) -> Result<(), LoadError> {
        match item {
            InitData::Int8(n) => mem.store(Chunk::Int8Unsigned, block, ofs, Value::Int(*n))?,
            InitData::Int16(n) => mem.store(Chunk::Int16Unsigned, block, ofs, Value::Int(*n))?,
            InitData::Int32(n) => mem.store(Chunk::Int32, block, ofs, Value::Int(*n))?,
            InitData::Float32(x) => mem.store(Chunk::Float32, block, ofs, Value::Float(*x))?,
            InitData::Float64(x) => mem.store(Chunk::Float64, block, ofs, Value::Float(*x))?,
            InitData::Space(n) => {
                for i in 0..*n as i32 {
                    mem.store(Chunk::Int8Unsigned, block, ofs + i, Value::Int(0))?;
                }
            }
            InitData::Addr(sym, delta) => {
                let addr = self
                    .symbol_address(sym, *delta)
                    .ok_or_else(|| LoadError::UnknownSymbol(sym.clone()))?;
                mem.store(Chunk::Int32, block, ofs, addr)?;
            }
        }
        Ok(())
    }

    /// Block of a global symbol.
    pub fn find_symbol(&self, name: &str) -> Option<Block> {
        self.symbols.get(name).copied()
    }

    /// Address of a global symbol plus a byte offset.
    pub fn symbol_address(&self, name: &str, ofs: i32) -> Option<Value> {
        self.find_symbol(name).map(|b| Value::ptr(b, ofs))
    }

    /// Definition of the function whose identity is `block`.
    pub fn find_funct_ptr(&self, block: Block) -> Option<&FunDef> {
        self.functions.get(&block)
    }

    /// Identity of the function a pointer value designates. Only pointers
    /// to offset 0 of a function block qualify.
    pub fn find_funct(&self, v: Value) -> Option<Block> {
        match v {
            Value::Ptr { block, offset: 0 } if self.functions.contains_key(&block) => Some(block),
            _ => None,
        }
    }

    /// Symbol name of a block, for diagnostics.
    pub fn name_of(&self, block: Block) -> Option<&str> {
        self.names.get(&block).map(String::as_str)
    }
}
