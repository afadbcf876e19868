//! The Synacor architecture's instruction set and numeric model.
//!
//! This module is pure schema. It defines:
//! - [`Opcode`]: the closed set of 22 instructions and their operand counts,
//! - [`Reg`]: one of the machine's 8 general-purpose registers,
//! - the architecture constants ([`MEM_SIZE`], [`MODULUS`], [`MIN_REG`], [`MAX_REG`]).
//!
//! All instruction *behavior* lives in [`crate::sim`]; the disassembler in
//! [`crate::disasm`] formats listings over the same table.

use std::num::TryFromIntError;

/// Number of addressable memory cells (and the arithmetic modulus).
pub const MEM_SIZE: usize = 32768;
/// All arithmetic results are reduced modulo this value.
pub const MODULUS: u16 = 32768;
/// Mask selecting the low 15 bits of a word (the architecture has no sign bit).
pub const BIT_MASK_15: u16 = 0x7FFF;
/// Number of general-purpose registers.
pub const NUM_REGS: usize = 8;
/// Lowest address value denoting a register (register 0).
pub const MIN_REG: u16 = MEM_SIZE as u16;
/// Highest address value denoting a register (register 7).
pub const MAX_REG: u16 = MIN_REG + NUM_REGS as u16 - 1;

/// An opcode of the Synacor architecture.
///
/// Each opcode is encoded as its literal word value (0–21) and takes a fixed
/// number of operand words (0–3), available via [`Opcode::arg_count`].
/// Any fetched word outside 0–21 is not an instruction; decoding is done with
/// [`Opcode::from_word`], which is exhaustive over the enum.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Opcode {
    #[allow(missing_docs)] Halt = 0,
    #[allow(missing_docs)] Set  = 1,
    #[allow(missing_docs)] Push = 2,
    #[allow(missing_docs)] Pop  = 3,
    #[allow(missing_docs)] Eq   = 4,
    #[allow(missing_docs)] Gt   = 5,
    #[allow(missing_docs)] Jmp  = 6,
    #[allow(missing_docs)] Jt   = 7,
    #[allow(missing_docs)] Jf   = 8,
    #[allow(missing_docs)] Add  = 9,
    #[allow(missing_docs)] Mult = 10,
    #[allow(missing_docs)] Mod  = 11,
    #[allow(missing_docs)] And  = 12,
    #[allow(missing_docs)] Or   = 13,
    #[allow(missing_docs)] Not  = 14,
    #[allow(missing_docs)] Rmem = 15,
    #[allow(missing_docs)] Wmem = 16,
    #[allow(missing_docs)] Call = 17,
    #[allow(missing_docs)] Ret  = 18,
    #[allow(missing_docs)] Out  = 19,
    #[allow(missing_docs)] In   = 20,
    #[allow(missing_docs)] Noop = 21,
}

impl Opcode {
    /// Decodes a word into an opcode, returning `None` for any word outside 0–21.
    pub fn from_word(word: u16) -> Option<Self> {
        match word {
            0  => Some(Opcode::Halt),
            1  => Some(Opcode::Set),
            2  => Some(Opcode::Push),
            3  => Some(Opcode::Pop),
            4  => Some(Opcode::Eq),
            5  => Some(Opcode::Gt),
            6  => Some(Opcode::Jmp),
            7  => Some(Opcode::Jt),
            8  => Some(Opcode::Jf),
            9  => Some(Opcode::Add),
            10 => Some(Opcode::Mult),
            11 => Some(Opcode::Mod),
            12 => Some(Opcode::And),
            13 => Some(Opcode::Or),
            14 => Some(Opcode::Not),
            15 => Some(Opcode::Rmem),
            16 => Some(Opcode::Wmem),
            17 => Some(Opcode::Call),
            18 => Some(Opcode::Ret),
            19 => Some(Opcode::Out),
            20 => Some(Opcode::In),
            21 => Some(Opcode::Noop),
            _  => None,
        }
    }

    /// The number of operand words following this opcode in memory.
    pub fn arg_count(self) -> usize {
        match self {
            Opcode::Halt | Opcode::Ret | Opcode::Noop => 0,
            Opcode::Push | Opcode::Pop | Opcode::Jmp
                | Opcode::Call | Opcode::Out | Opcode::In => 1,
            Opcode::Set | Opcode::Jt | Opcode::Jf
                | Opcode::Not | Opcode::Rmem | Opcode::Wmem => 2,
            Opcode::Eq | Opcode::Gt | Opcode::Add
                | Opcode::Mult | Opcode::Mod | Opcode::And | Opcode::Or => 3,
        }
    }

    /// The opcode's mnemonic, as used in listings and state dumps.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Halt => "halt",
            Opcode::Set  => "set",
            Opcode::Push => "push",
            Opcode::Pop  => "pop",
            Opcode::Eq   => "eq",
            Opcode::Gt   => "gt",
            Opcode::Jmp  => "jmp",
            Opcode::Jt   => "jt",
            Opcode::Jf   => "jf",
            Opcode::Add  => "add",
            Opcode::Mult => "mult",
            Opcode::Mod  => "mod",
            Opcode::And  => "and",
            Opcode::Or   => "or",
            Opcode::Not  => "not",
            Opcode::Rmem => "rmem",
            Opcode::Wmem => "wmem",
            Opcode::Call => "call",
            Opcode::Ret  => "ret",
            Opcode::Out  => "out",
            Opcode::In   => "in",
            Opcode::Noop => "noop",
        }
    }
}
impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A register. Must be between 0 and 7.
///
/// A `Reg` can be constructed from a short index with [`Reg::try_from`], or
/// from an address-space value in the register range with [`Reg::from_addr`]:
///
/// ```
/// use synacor_vm::isa::Reg;
///
/// assert_eq!(Reg::try_from(3).unwrap().reg_no(), 3);
/// assert_eq!(Reg::from_addr(32771).unwrap().reg_no(), 3);
/// assert_eq!(Reg::from_addr(3), None); // 3 is a memory address, not a register
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Reg(pub(crate) u8);

/// Register constants!
pub mod reg_consts {
    use super::Reg;

    /// The 0th register in the register file.
    pub const R0: Reg = Reg(0);
    /// The 1st register in the register file.
    pub const R1: Reg = Reg(1);
    /// The 2nd register in the register file.
    pub const R2: Reg = Reg(2);
    /// The 3rd register in the register file.
    pub const R3: Reg = Reg(3);
    /// The 4th register in the register file.
    pub const R4: Reg = Reg(4);
    /// The 5th register in the register file.
    pub const R5: Reg = Reg(5);
    /// The 6th register in the register file.
    pub const R6: Reg = Reg(6);
    /// The 7th register in the register file.
    pub const R7: Reg = Reg(7);
}

impl Reg {
    /// Gets the register number of this [`Reg`]. This is always between 0 and 7.
    pub fn reg_no(self) -> u8 {
        self.0
    }

    /// Maps an address-space value to a register, if it lies in the register
    /// range ([`MIN_REG`]..=[`MAX_REG`]).
    ///
    /// This is the address-resolution half of interpreted fetches and write
    /// routing: values below [`MIN_REG`] name memory cells and return `None`.
    pub fn from_addr(addr: u16) -> Option<Self> {
        match addr {
            MIN_REG..=MAX_REG => Some(Reg((addr - MIN_REG) as u8)),
            _ => None,
        }
    }

    /// The address-space value denoting this register.
    pub fn addr(self) -> u16 {
        MIN_REG + u16::from(self.0)
    }
}
impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}
impl From<Reg> for usize {
    // Used for indexing the reg file in [`crate::sim::mem::RegFile`].
    fn from(value: Reg) -> Self {
        usize::from(value.0)
    }
}
impl TryFrom<u8> for Reg {
    type Error = TryFromIntError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0..=7 => Ok(Reg(value)),
            // HACKy, but there's no other way to create this error
            _     => u8::try_from(256).map(|_| unreachable!("should've been TryFromIntError")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_decode_roundtrip() {
        for word in 0..=21 {
            let op = Opcode::from_word(word).unwrap();
            assert_eq!(op as u16, word);
        }
        assert_eq!(Opcode::from_word(22), None);
        assert_eq!(Opcode::from_word(0x7FFF), None);
        assert_eq!(Opcode::from_word(u16::MAX), None);
    }

    #[test]
    fn test_opcode_arg_counts() {
        // The full arity table.
        let expected = [
            (Opcode::Halt, 0), (Opcode::Set, 2),  (Opcode::Push, 1), (Opcode::Pop, 1),
            (Opcode::Eq, 3),   (Opcode::Gt, 3),   (Opcode::Jmp, 1),  (Opcode::Jt, 2),
            (Opcode::Jf, 2),   (Opcode::Add, 3),  (Opcode::Mult, 3), (Opcode::Mod, 3),
            (Opcode::And, 3),  (Opcode::Or, 3),   (Opcode::Not, 2),  (Opcode::Rmem, 2),
            (Opcode::Wmem, 2), (Opcode::Call, 1), (Opcode::Ret, 0),  (Opcode::Out, 1),
            (Opcode::In, 1),   (Opcode::Noop, 0),
        ];
        for (op, n) in expected {
            assert_eq!(op.arg_count(), n, "wrong arity for {op}");
        }
    }

    #[test]
    fn test_reg_from_addr() {
        assert_eq!(Reg::from_addr(MIN_REG), Some(reg_consts::R0));
        assert_eq!(Reg::from_addr(MAX_REG), Some(reg_consts::R7));
        assert_eq!(Reg::from_addr(MIN_REG - 1), None);
        assert_eq!(Reg::from_addr(MAX_REG + 1), None);
        assert_eq!(Reg::from_addr(0), None);
    }

    #[test]
    fn test_reg_try_from() {
        assert_eq!(Reg::try_from(0), Ok(reg_consts::R0));
        assert_eq!(Reg::try_from(7), Ok(reg_consts::R7));
        assert!(Reg::try_from(8).is_err());
    }
}
