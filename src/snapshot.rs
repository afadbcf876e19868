//! Serialization of full machine state to a fixed binary layout.
//!
//! A snapshot captures everything a [`Simulator`] needs to resume exactly
//! where it left off: the instruction pointer, all of memory, the registers,
//! the stack, and both I/O queues. Breakpoints are *not* captured; they are
//! a property of the debugging session, not of the machine.
//!
//! # Layout
//!
//! All multi-byte fields are little-endian. Sections appear in this order,
//! each variable-length section prefixed by a `u32` element count:
//!
//! | section   | count        | element     |
//! |-----------|--------------|-------------|
//! | ip        | (none)       | `u16`       |
//! | memory    | always 32768 | `u16`       |
//! | registers | always 8     | `u16`       |
//! | stack     | depth        | `u16`, bottom first |
//! | input     | length       | `u8`        |
//! | output    | length       | `u8`        |
//!
//! [`deserialize`] is strict: a memory section of any other size, a register
//! section of any other size, a truncated section, or trailing bytes after
//! the output section all reject the snapshot. A failed load leaves any
//! machine the caller already holds untouched.

use std::fs;
use std::path::Path;

use crate::isa::{MEM_SIZE, NUM_REGS};
use crate::sim::io::BufferedIO;
use crate::sim::mem::{MemArray, RegFile};
use crate::sim::Simulator;

/// Errors that can occur while reading or writing a snapshot.
#[derive(Debug)]
pub enum SnapshotErr {
    /// Error from writing or reading the snapshot file.
    Io(std::io::Error),
    /// The data ended in the middle of a section.
    UnexpectedEof,
    /// The memory section's element count was not exactly 32768.
    BadMemoryLen(u32),
    /// The register section's element count was not exactly 8.
    BadRegisterLen(u32),
    /// Bytes remained after the final section.
    TrailingBytes(usize),
}
impl std::fmt::Display for SnapshotErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotErr::Io(e)              => write!(f, "IO error: {e}"),
            SnapshotErr::UnexpectedEof      => f.write_str("snapshot data ended unexpectedly"),
            SnapshotErr::BadMemoryLen(n)    => write!(f, "memory section holds {n} cells, expected {MEM_SIZE}"),
            SnapshotErr::BadRegisterLen(n)  => write!(f, "register section holds {n} registers, expected {NUM_REGS}"),
            SnapshotErr::TrailingBytes(n)   => write!(f, "{n} unexpected trailing byte(s)"),
        }
    }
}
impl std::error::Error for SnapshotErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotErr::Io(e) => Some(e),
            _ => None,
        }
    }
}
impl From<std::io::Error> for SnapshotErr {
    fn from(value: std::io::Error) -> Self {
        SnapshotErr::Io(value)
    }
}

/// Serializes the machine state into the snapshot layout.
pub fn serialize(sim: &Simulator) -> Vec<u8> {
    // 2 bytes of ip, 3 word sections with u32 prefixes, 2 byte sections.
    let words = MEM_SIZE + NUM_REGS + sim.stack.len();
    let mut bytes = Vec::with_capacity(
        2 + 5 * 4 + 2 * words + sim.io.input().len() + sim.io.output().len(),
    );

    bytes.extend_from_slice(&sim.ip.to_le_bytes());
    put_words(&mut bytes, sim.mem.as_slice());
    put_words(&mut bytes, sim.reg_file.as_slice());
    put_words(&mut bytes, &sim.stack);
    put_bytes(&mut bytes, sim.io.input());
    put_bytes(&mut bytes, sim.io.output());

    bytes
}

/// Reconstructs a machine from snapshot data.
pub fn deserialize(data: &[u8]) -> Result<Simulator, SnapshotErr> {
    let mut data = data;

    let ip = take_u16(&mut data)?;

    let mem_len = take_u32(&mut data)?;
    if mem_len as usize != MEM_SIZE {
        return Err(SnapshotErr::BadMemoryLen(mem_len));
    }
    let cells = take_words(&mut data, MEM_SIZE)?;

    let reg_len = take_u32(&mut data)?;
    if reg_len as usize != NUM_REGS {
        return Err(SnapshotErr::BadRegisterLen(reg_len));
    }
    let regs = take_words(&mut data, NUM_REGS)?;
    let regs: [u16; NUM_REGS] = regs.try_into()
        .map_err(|_| SnapshotErr::UnexpectedEof)?;

    let depth = take_u32(&mut data)?;
    let stack = take_words(&mut data, depth as usize)?;

    let input_len = take_u32(&mut data)?;
    let input = take_slice(&mut data, input_len as usize)?.to_vec();
    let output_len = take_u32(&mut data)?;
    let output = take_slice(&mut data, output_len as usize)?.to_vec();

    if !data.is_empty() {
        return Err(SnapshotErr::TrailingBytes(data.len()));
    }

    Ok(Simulator::from_raw_parts(
        ip,
        MemArray::with_image(&cells),
        RegFile::from(regs),
        stack,
        BufferedIO::from_queues(input.into(), output.into()),
    ))
}

/// Writes the machine state to a snapshot file.
pub fn save(sim: &Simulator, path: impl AsRef<Path>) -> Result<(), SnapshotErr> {
    fs::write(path, serialize(sim))?;
    Ok(())
}

/// Reads a machine back from a snapshot file.
pub fn load(path: impl AsRef<Path>) -> Result<Simulator, SnapshotErr> {
    deserialize(&fs::read(path)?)
}

/// Appends a count-prefixed word section.
fn put_words(bytes: &mut Vec<u8>, words: &[u16]) {
    bytes.extend_from_slice(&(words.len() as u32).to_le_bytes());
    for &word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
}

/// Appends a count-prefixed byte section.
fn put_bytes(bytes: &mut Vec<u8>, queue: &std::collections::VecDeque<u8>) {
    bytes.extend_from_slice(&(queue.len() as u32).to_le_bytes());
    bytes.extend(queue.iter().copied());
}

/// Takes the next `N` bytes from the data, advancing the slice.
fn take<const N: usize>(data: &mut &[u8]) -> Result<[u8; N], SnapshotErr> {
    if data.len() < N {
        return Err(SnapshotErr::UnexpectedEof);
    }
    let (chunk, rest) = data.split_at(N);
    *data = rest;
    chunk.try_into().map_err(|_| SnapshotErr::UnexpectedEof)
}

/// Takes the next `n` bytes from the data as a slice, advancing it.
fn take_slice<'d>(data: &mut &'d [u8], n: usize) -> Result<&'d [u8], SnapshotErr> {
    if data.len() < n {
        return Err(SnapshotErr::UnexpectedEof);
    }
    let (chunk, rest) = data.split_at(n);
    *data = rest;
    Ok(chunk)
}

fn take_u16(data: &mut &[u8]) -> Result<u16, SnapshotErr> {
    take::<2>(data).map(u16::from_le_bytes)
}

fn take_u32(data: &mut &[u8]) -> Result<u32, SnapshotErr> {
    take::<4>(data).map(u32::from_le_bytes)
}

/// Takes `n` little-endian words from the data.
fn take_words(data: &mut &[u8], n: usize) -> Result<Vec<u16>, SnapshotErr> {
    let raw = take_slice(data, n * 2)?;
    Ok(raw.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect())
}

#[cfg(test)]
mod tests {
    use crate::isa::reg_consts::{R0, R1};
    use crate::sim::{Simulator, Status};

    use super::{deserialize, serialize, SnapshotErr};

    /// A machine with nontrivial state in every section: ip mid-program, a
    /// register set, a value on the stack, and both queues populated.
    fn busy_machine() -> Simulator {
        // set r0 = 5, push 77, out 'A', in r1, halt
        let mut sim = Simulator::new(&[1, 32768, 5, 2, 77, 19, 65, 20, 32769, 0]);
        assert_eq!(sim.run(), Ok(Status::AwaitingInput));
        sim.buffer_input("go");
        sim
    }

    #[test]
    fn test_byte_level_round_trip() {
        let bytes = serialize(&busy_machine());
        let restored = deserialize(&bytes).unwrap();
        assert_eq!(serialize(&restored), bytes);
    }

    #[test]
    fn test_restored_machine_resumes_identically() {
        let mut original = busy_machine();
        let mut restored = deserialize(&serialize(&original)).unwrap();

        assert_eq!(restored.ip(), original.ip());
        assert_eq!(restored.reg(R0), 5);
        assert_eq!(restored.stack(), &[77]);

        assert_eq!(restored.run(), Ok(Status::Halted));
        assert_eq!(original.run(), Ok(Status::Halted));
        assert_eq!(restored.reg(R1), original.reg(R1));
        assert_eq!(restored.drain_output(), original.drain_output());
    }

    #[test]
    fn test_breakpoints_are_not_persisted() {
        let mut sim = Simulator::new(&[21, 0]);
        sim.add_breakpoint(1);
        let restored = deserialize(&serialize(&sim)).unwrap();
        assert!(restored.breakpoints().is_empty());
    }

    #[test]
    fn test_truncated_data_is_rejected() {
        let bytes = serialize(&busy_machine());
        for cut in [0, 1, 5, bytes.len() / 2, bytes.len() - 1] {
            assert!(
                matches!(deserialize(&bytes[..cut]), Err(SnapshotErr::UnexpectedEof)),
                "cut at {cut} should fail"
            );
        }
    }

    #[test]
    fn test_wrong_section_counts_are_rejected() {
        let mut bytes = serialize(&busy_machine());

        // Memory count field sits right after the 2-byte ip.
        bytes[2..6].copy_from_slice(&100u32.to_le_bytes());
        assert!(matches!(deserialize(&bytes), Err(SnapshotErr::BadMemoryLen(100))));
    }

    #[test]
    fn test_trailing_bytes_are_rejected() {
        let mut bytes = serialize(&busy_machine());
        bytes.push(0);
        assert!(matches!(deserialize(&bytes), Err(SnapshotErr::TrailingBytes(1))));
    }

    #[test]
    fn test_save_load_file() {
        let path = std::env::temp_dir().join("synacor-vm-snapshot-test.bin");
        let sim = busy_machine();
        sim.save(&path).unwrap();

        let restored = Simulator::load(&path).unwrap();
        assert_eq!(serialize(&restored), serialize(&sim));
        let _ = std::fs::remove_file(&path);
    }
}
