//! Machine registers and the register file.

use crate::chunk::Ty;
use crate::error::NameError;
use crate::value::Value;
use std::str::FromStr;

/// Number of integer registers (`r0`..`r15`).
pub const NUM_INT_REGS: u8 = 16;

/// Number of float registers (`f0`..`f15`).
pub const NUM_FLOAT_REGS: u8 = 16;

const NUM_REGS: usize = (NUM_INT_REGS + NUM_FLOAT_REGS) as usize;

/// A machine register. Integer registers come first, then float registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MReg(u8);

impl MReg {
    /// Integer register `r{n}`. Panics if `n >= NUM_INT_REGS`.
    pub const fn r(n: u8) -> MReg {
        assert!(n < NUM_INT_REGS, "integer register out of range");
        MReg(n)
    }

    /// Float register `f{n}`. Panics if `n >= NUM_FLOAT_REGS`.
    pub const fn f(n: u8) -> MReg {
        assert!(n < NUM_FLOAT_REGS, "float register out of range");
        MReg(NUM_INT_REGS + n)
    }

    /// Register class.
    pub fn ty(self) -> Ty {
        if self.0 < NUM_INT_REGS {
            Ty::Int
        } else {
            Ty::Float
        }
    }

    /// Number within its class.
    pub fn number(self) -> u8 {
        match self.ty() {
            Ty::Int => self.0,
            Ty::Float => self.0 - NUM_INT_REGS,
        }
    }

    /// Every register, integers first.
    pub fn all() -> impl Iterator<Item = MReg> {
        (0..NUM_REGS as u8).map(MReg)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for MReg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ty() {
            Ty::Int => write!(f, "r{}", self.number()),
            Ty::Float => write!(f, "f{}", self.number()),
        }
    }
}

impl FromStr for MReg {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || NameError::UnknownRegister(s.to_string());
        if !s.is_ascii() {
            return Err(err());
        }
        let lower = s.to_ascii_lowercase();
        let (class, digits) = lower.split_at(lower.len().min(1));
        // Reject "r01" and "r+1" so that every register has one spelling.
        if digits.is_empty()
            || !digits.bytes().all(|b| b.is_ascii_digit())
            || (digits.len() > 1 && digits.starts_with('0'))
        {
            return Err(err());
        }
        let n: u8 = digits.parse().map_err(|_| err())?;
        match class {
            "r" if n < NUM_INT_REGS => Ok(MReg::r(n)),
            "f" if n < NUM_FLOAT_REGS => Ok(MReg::f(n)),
            _ => Err(err()),
        }
    }
}

/// Total mapping from registers to values. Every register starts `Undef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegFile {
    values: [Value; NUM_REGS],
}

impl Default for RegFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegFile {
    /// A register file with every register undefined.
    pub fn new() -> Self {
        Self {
            values: [Value::Undef; NUM_REGS],
        }
    }

    pub fn get(&self, r: MReg) -> Value {
        self.values[r.index()]
    }

    /// Replace the binding of `r`; every other register is unchanged.
    pub fn set(&mut self, r: MReg, v: Value) {
        self.values[r.index()] = v;
    }

    /// Values of `regs`, in order.
    pub fn get_list(&self, regs: &[MReg]) -> Vec<Value> {
        regs.iter().map(|&r| self.get(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_and_names() {
        assert_eq!(MReg::r(3).ty(), Ty::Int);
        assert_eq!(MReg::f(3).ty(), Ty::Float);
        assert_eq!(MReg::r(15).to_string(), "r15");
        assert_eq!(MReg::f(0).to_string(), "f0");
        assert_eq!(MReg::all().count(), 32);
    }

    #[test]
    fn parse_registers() {
        assert_eq!("r7".parse::<MReg>(), Ok(MReg::r(7)));
        assert_eq!("F2".parse::<MReg>(), Ok(MReg::f(2)));
        assert!("r16".parse::<MReg>().is_err());
        assert!("r01".parse::<MReg>().is_err());
        assert!("x1".parse::<MReg>().is_err());
        assert!("r".parse::<MReg>().is_err());
        assert!("".parse::<MReg>().is_err());
    }

    #[test]
    fn every_register_round_trips_through_its_name() {
        for r in MReg::all() {
            assert_eq!(r.to_string().parse::<MReg>(), Ok(r));
        }
    }

    #[test]
    fn regfile_starts_undefined() {
        let rs = RegFile::new();
        assert!(MReg::all().all(|r| rs.get(r) == Value::Undef));
    }

    #[test]
    fn regfile_set_touches_one_register() {
        let mut rs = RegFile::new();
        rs.set(MReg::r(2), Value::Int(9));
        for r in MReg::all() {
            let expected = if r == MReg::r(2) {
                Value::Int(9)
            } else {
                Value::Undef
            };
            assert_eq!(rs.get(r), expected);
        }
    }
}
