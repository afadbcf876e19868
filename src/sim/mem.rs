//! Memory handling for the Synacor machine.
//!
//! This module consists of:
//! - [`MemArray`]: the 32768-cell word memory.
//! - [`RegFile`]: the register file.
//!
//! Both stores only hand out words through checked accessors; the simulator's
//! address-resolution layer ([`crate::sim::Simulator`]) decides which store a
//! given address value refers to.

use crate::isa::{Reg, MEM_SIZE, NUM_REGS};

use super::SimErr;

/// The machine's memory.
///
/// This is addressable with any value in `0..32768`; addresses at or above
/// [`MIN_REG`] denote registers and are rejected here with
/// [`SimErr::BadAddress`]; routing such addresses to the [`RegFile`] is the
/// simulator's job, not the memory's.
///
/// Note that this struct provides two methods of accessing memory:
/// - [`MemArray::read`] and [`MemArray::write`]: fallible, bounds-checked access
///   used by the execution engine.
/// - [`MemArray::as_slice`]: direct access for read-only consumers
///   (persistence, disassembly), which cannot produce an invalid address.
///
/// [`MIN_REG`]: crate::isa::MIN_REG
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemArray {
    // Held in the heap; 32768 words is too large for the stack.
    data: Box<[u16; MEM_SIZE]>,
}

impl MemArray {
    /// Creates a zeroed memory.
    pub fn new() -> Self {
        Self {
            data: vec![0u16; MEM_SIZE]
                .into_boxed_slice()
                .try_into()
                .unwrap_or_else(|_| unreachable!("vec should have had {MEM_SIZE} elements")),
        }
    }

    /// Creates a memory holding the given program image at address 0.
    ///
    /// # Panics
    ///
    /// This will panic if the image is larger than memory ([`MEM_SIZE`] words).
    /// The loaders in [`crate::image`] and [`crate::snapshot`] never produce
    /// such an image.
    pub fn with_image(program: &[u16]) -> Self {
        assert!(
            program.len() <= MEM_SIZE,
            "program image ({} words) exceeds memory ({MEM_SIZE} words)",
            program.len()
        );

        let mut mem = Self::new();
        mem.data[..program.len()].copy_from_slice(program);
        mem
    }

    /// Fallibly reads the word at the provided address, erroring if the
    /// address does not name a memory cell.
    pub fn read(&self, addr: u16) -> Result<u16, SimErr> {
        self.data
            .get(usize::from(addr))
            .copied()
            .ok_or(SimErr::BadAddress(addr))
    }

    /// Fallibly writes the word at the provided address, erroring if the
    /// address does not name a memory cell.
    pub fn write(&mut self, addr: u16, val: u16) -> Result<(), SimErr> {
        match self.data.get_mut(usize::from(addr)) {
            Some(cell) => {
                *cell = val;
                Ok(())
            }
            None => Err(SimErr::BadAddress(addr)),
        }
    }

    /// Gets the memory's contents as a slice of `MEM_SIZE` words.
    pub fn as_slice(&self) -> &[u16] {
        &self.data[..]
    }
}
impl Default for MemArray {
    fn default() -> Self {
        Self::new()
    }
}

/// The register file.
///
/// This struct can be indexed with a [`Reg`]
/// (which can be constructed using the [`crate::isa::reg_consts`] module,
/// via [`Reg::try_from`], or from an address-space value via [`Reg::from_addr`]).
///
/// # Example
///
/// ```
/// use synacor_vm::sim::mem::RegFile;
/// use synacor_vm::isa::reg_consts::R0;
///
/// let mut reg = RegFile::new();
/// reg[R0] = 11;
/// assert_eq!(reg[R0], 11);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegFile([u16; NUM_REGS]);
impl RegFile {
    /// Creates a zeroed register file.
    pub fn new() -> Self {
        Self([0; NUM_REGS])
    }

    /// Gets the register file's contents as a slice of 8 words.
    pub fn as_slice(&self) -> &[u16] {
        &self.0
    }
}
impl Default for RegFile {
    fn default() -> Self {
        Self::new()
    }
}
impl From<[u16; NUM_REGS]> for RegFile {
    fn from(value: [u16; NUM_REGS]) -> Self {
        Self(value)
    }
}
impl std::ops::Index<Reg> for RegFile {
    type Output = u16;

    fn index(&self, index: Reg) -> &Self::Output {
        &self.0[usize::from(index)]
    }
}
impl std::ops::IndexMut<Reg> for RegFile {
    fn index_mut(&mut self, index: Reg) -> &mut Self::Output {
        &mut self.0[usize::from(index)]
    }
}

#[cfg(test)]
mod tests {
    use crate::isa::reg_consts::{R0, R7};
    use crate::isa::{MEM_SIZE, MIN_REG};
    use crate::sim::SimErr;

    use super::{MemArray, RegFile};

    #[test]
    fn test_mem_bounds() {
        let mut mem = MemArray::new();
        assert_eq!(mem.read(0), Ok(0));
        assert_eq!(mem.read((MEM_SIZE - 1) as u16), Ok(0));
        assert_eq!(mem.read(MIN_REG), Err(SimErr::BadAddress(MIN_REG)));
        assert_eq!(mem.write(MIN_REG, 1), Err(SimErr::BadAddress(MIN_REG)));
        assert_eq!(mem.write(u16::MAX, 1), Err(SimErr::BadAddress(u16::MAX)));

        mem.write(5, 1234).unwrap();
        assert_eq!(mem.read(5), Ok(1234));
    }

    #[test]
    fn test_mem_image() {
        let mem = MemArray::with_image(&[9, 32768, 32769, 4]);
        assert_eq!(&mem.as_slice()[..5], &[9, 32768, 32769, 4, 0]);
    }

    #[test]
    #[should_panic = "exceeds memory"]
    fn test_mem_image_too_large() {
        let _ = MemArray::with_image(&vec![0; MEM_SIZE + 1]);
    }

    #[test]
    fn test_reg_file() {
        let mut reg = RegFile::new();
        assert_eq!(reg.as_slice(), &[0; 8]);

        reg[R0] = 5;
        reg[R7] = 32767;
        assert_eq!(reg[R0], 5);
        assert_eq!(reg[R7], 32767);
    }
}
