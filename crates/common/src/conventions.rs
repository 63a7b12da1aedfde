//! Calling convention: where arguments and results live.
//!
//! Integer arguments go to the integer parameter registers in order and
//! float arguments to the float parameter registers; once a class runs out,
//! further arguments of that class are passed in outgoing stack slots.
//! Stack slots are allocated left to right in word units, one word for an
//! integer and two for a float.

use crate::chunk::Ty;
use crate::program::Signature;
use crate::reg::MReg;

/// Location of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loc {
    Reg(MReg),
    /// Word offset from the caller's stack pointer.
    Outgoing { ofs: i32, ty: Ty },
}

/// Register assignment for calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallingConvention {
    pub int_params: Vec<MReg>,
    pub float_params: Vec<MReg>,
    pub int_result: MReg,
    pub float_result: MReg,
}

impl Default for CallingConvention {
    /// `r0`-`r3` and `f0`-`f1` for arguments; results in `r0` / `f0`.
    fn default() -> Self {
        Self {
            int_params: (0..4).map(MReg::r).collect(),
            float_params: (0..2).map(MReg::f).collect(),
            int_result: MReg::r(0),
            float_result: MReg::f(0),
        }
    }
}

impl CallingConvention {
    /// The default convention with only the first `n` integer parameter registers.
    pub fn with_int_params(n: usize) -> Self {
        let mut conv = Self::default();
        conv.int_params.truncate(n);
        conv
    }

    /// Argument locations for `sig`, in argument order.
    pub fn loc_arguments(&self, sig: &Signature) -> Vec<Loc> {
        let mut next_int = 0;
        let mut next_float = 0;
        let mut stack_ofs = 0;
        sig.args
            .iter()
            .map(|&ty| {
                let (regs, next) = match ty {
                    Ty::Int => (&self.int_params, &mut next_int),
                    Ty::Float => (&self.float_params, &mut next_float),
                };
                if let Some(&r) = regs.get(*next) {
                    *next += 1;
                    Loc::Reg(r)
                } else {
                    let loc = Loc::Outgoing { ofs: stack_ofs, ty };
                    stack_ofs += ty.words();
                    loc
                }
            })
            .collect()
    }

    /// Register receiving the result of a call with signature `sig`.
    /// Functions without a result still clobber the integer result register.
    pub fn loc_result(&self, sig: &Signature) -> MReg {
        match sig.result {
            Some(Ty::Float) => self.float_result,
            Some(Ty::Int) | None => self.int_result,
        }
    }

    /// Words of outgoing stack space a call with `sig` needs.
    pub fn outgoing_words(&self, sig: &Signature) -> i32 {
        self.loc_arguments(sig)
            .iter()
            .map(|l| match l {
                Loc::Outgoing { ofs, ty } => ofs + ty.words(),
                Loc::Reg(_) => 0,
            })
            .max()
            .unwrap_or(0)
    }
}
