//! Simulation and execution of Synacor-architecture bytecode.
//!
//! This module is focused on executing a program image (a sequence of 15-bit
//! words, typically produced by [`crate::image`]).
//!
//! This module consists of:
//! - [`Simulator`]: The struct that owns one machine's state and executes it.
//! - [`mem`]: The module handling the memory and register backing stores.
//! - [`io`]: The module handling the machine's buffered input/output queues.
//! - [`debug`]: The module handling breakpoints, state patching, and dumps.
//!
//! # Usage
//!
//! To simulate a program, instantiate a Simulator with its image and run it:
//!
//! ```
//! use synacor_vm::sim::{Simulator, Status};
//!
//! // set r0 = 5, out 'H', halt
//! let mut sim = Simulator::new(&[1, 32768, 5, 19, 72, 0]);
//!
//! assert_eq!(sim.run().unwrap(), Status::Halted);
//! assert_eq!(sim.drain_output(), "H");
//! ```
//!
//! ## Execution
//!
//! [`Simulator::run`] executes until a terminal [`Status`] (halted, breakpoint
//! hit, or input starvation); [`Simulator::step`] executes exactly one
//! instruction and also reports [`Status::Running`] when there is more to do.
//!
//! ```
//! use synacor_vm::sim::Simulator;
//! use synacor_vm::isa::reg_consts::R0;
//!
//! // set r0 = 5, noop
//! let mut sim = Simulator::new(&[1, 32768, 5, 21]);
//!
//! sim.step().unwrap();
//! assert_eq!(sim.reg(R0), 5);
//! sim.step().unwrap();
//! assert_eq!(sim.ip(), 4);
//! ```
//!
//! ## Input and output
//!
//! The machine performs no console I/O of its own. The `out` instruction
//! appends to an output queue drained with [`Simulator::drain_output`]; the
//! `in` instruction consumes from an input queue fed with
//! [`Simulator::buffer_input`]. When `in` executes with an empty queue, the
//! machine does not block: it rewinds to the `in` instruction and returns
//! [`Status::AwaitingInput`], and the caller resumes it by buffering a line
//! and calling [`Simulator::run`] again. This is what makes the simulator
//! safe to drive from a shell, a script, or a test without threads.
//!
//! ```
//! use synacor_vm::sim::{Simulator, Status};
//! use synacor_vm::isa::reg_consts::R0;
//!
//! // in r0, halt
//! let mut sim = Simulator::new(&[20, 32768, 0]);
//!
//! assert_eq!(sim.run().unwrap(), Status::AwaitingInput);
//! assert_eq!(sim.ip(), 0); // still pointing at the `in`
//!
//! sim.buffer_input("y");
//! assert_eq!(sim.run().unwrap(), Status::Halted);
//! assert_eq!(sim.reg(R0), u16::from(b'y'));
//! ```
//!
//! ## Debugging
//!
//! Breakpoints are plain memory addresses; [`Simulator::run`] stops with
//! [`Status::Breakpoint`] *before* executing the instruction at one, and
//! [`Simulator::step`] is the way past it (it ignores breakpoints). See
//! [`debug`] for the full instrumentation surface.

pub mod debug;
pub mod io;
pub mod mem;

use std::collections::HashSet;
use std::path::Path;

use crate::isa::{Opcode, Reg, BIT_MASK_15, MODULUS};
use crate::snapshot::{self, SnapshotErr};

use self::io::BufferedIO;
use self::mem::{MemArray, RegFile};

/// Fatal errors that can occur during simulation.
///
/// Every variant aborts the current [`Simulator::run`]/[`Simulator::step`]
/// call; none are retried or swallowed by the engine. Input starvation is not
/// an error; it is [`Status::AwaitingInput`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SimErr {
    /// A fetched opcode word was outside the defined instruction set.
    IllegalOpcode(u16),
    /// An address at or above the memory size was used as a memory reference.
    BadAddress(u16),
    /// A value outside the register range (or outside 0–7 for debug patches)
    /// was used as a register reference.
    BadRegister(u16),
    /// `pop` was executed with an empty stack.
    ///
    /// Distinct from `ret` on an empty stack, which deliberately halts.
    StackUnderflow,
    /// `mod` was executed with a zero divisor.
    DivideByZero,
}
impl std::fmt::Display for SimErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimErr::IllegalOpcode(word) => write!(f, "illegal opcode [{word}]"),
            SimErr::BadAddress(adr)     => write!(f, "invalid memory address [{adr}]"),
            SimErr::BadRegister(adr)    => write!(f, "invalid register [{adr}]"),
            SimErr::StackUnderflow      => f.write_str("cannot execute pop: stack is empty"),
            SimErr::DivideByZero        => f.write_str("cannot execute mod: divisor is zero"),
        }
    }
}
impl std::error::Error for SimErr {}

/// Why a [`Simulator::step`] or [`Simulator::run`] call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The instruction executed normally and the machine can continue.
    ///
    /// Returned by [`Simulator::step`] only; [`Simulator::run`] keeps going
    /// until one of the terminal variants.
    Running,
    /// The machine executed `halt` (or `ret` with an empty stack).
    Halted,
    /// [`Simulator::run`] reached a breakpoint address. The instruction at
    /// that address has *not* been executed.
    Breakpoint,
    /// The machine executed `in` with no buffered input. The instruction
    /// pointer was rewound, so buffering input and re-running re-executes
    /// the same `in`.
    AwaitingInput,
}
impl Status {
    /// Whether this status means execution can continue.
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }
}

/// Executes Synacor-architecture bytecode.
///
/// A `Simulator` exclusively owns one machine state: memory, registers, the
/// unbounded stack, the instruction pointer, the I/O queues, and the
/// breakpoint set. Creating one ([`Simulator::new`]) or loading one
/// ([`Simulator::load`]) replaces the state wholesale; there is no partial
/// reload.
#[derive(Debug, Clone)]
pub struct Simulator {
    /// The machine's memory.
    pub(crate) mem: MemArray,
    /// The machine's register file.
    pub(crate) reg_file: RegFile,
    /// The instruction pointer.
    pub(crate) ip: u16,
    /// The machine's stack, bottom first.
    pub(crate) stack: Vec<u16>,
    /// The machine's buffered input/output queues.
    pub(crate) io: BufferedIO,
    /// Breakpoint addresses, consulted by [`Simulator::run`] before each fetch.
    pub(crate) breakpoints: HashSet<u16>,
}

impl Simulator {
    /// Creates a machine with the given program image loaded at address 0
    /// and everything else zeroed.
    ///
    /// # Panics
    ///
    /// This will panic if the image is larger than memory (32768 words);
    /// see [`MemArray::with_image`].
    pub fn new(program: &[u16]) -> Self {
        Self {
            mem: MemArray::with_image(program),
            reg_file: RegFile::new(),
            ip: 0,
            stack: Vec::new(),
            io: BufferedIO::new(),
            breakpoints: HashSet::new(),
        }
    }

    /// Reassembles a machine from persisted state.
    pub(crate) fn from_raw_parts(
        ip: u16,
        mem: MemArray,
        reg_file: RegFile,
        stack: Vec<u16>,
        io: BufferedIO,
    ) -> Self {
        Self { mem, reg_file, ip, stack, io, breakpoints: HashSet::new() }
    }

    /// The current instruction pointer.
    pub fn ip(&self) -> u16 {
        self.ip
    }

    /// The current value of a register.
    pub fn reg(&self, reg: Reg) -> u16 {
        self.reg_file[reg]
    }

    /// A read-only view of the machine's memory.
    pub fn mem(&self) -> &MemArray {
        &self.mem
    }

    /// A read-only view of the machine's stack, bottom first.
    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    /// Appends the text's characters to the machine's input queue, appending
    /// a trailing newline if the text lacks one.
    ///
    /// The hosted program reads commands a line at a time, so un-terminated
    /// input would starve it on the next `in`.
    pub fn buffer_input(&mut self, text: &str) {
        self.io.buffer_command(text);
    }

    /// Removes and returns all currently queued output characters, in
    /// production order.
    pub fn drain_output(&mut self) -> String {
        self.io.drain_output()
    }

    /// Execute the program.
    ///
    /// This steps repeatedly until the machine halts, hits a breakpoint, or
    /// starves for input, and returns that terminal status.
    /// [`Status::Running`] is never returned from this function.
    pub fn run(&mut self) -> Result<Status, SimErr> {
        loop {
            if self.breakpoints.contains(&self.ip) {
                return Ok(Status::Breakpoint);
            }
            match self.step()? {
                Status::Running => {}
                status => return Ok(status),
            }
        }
    }

    /// Simulate one step, executing exactly one instruction.
    ///
    /// Unlike [`Simulator::run`], this does not consult the breakpoint set:
    /// stepping is how execution proceeds *past* a breakpoint after `run`
    /// has stopped on it.
    pub fn step(&mut self) -> Result<Status, SimErr> {
        let word = self.fetch_literal()?;
        let opcode = Opcode::from_word(word).ok_or(SimErr::IllegalOpcode(word))?;
        self.execute(opcode)
    }

    /// Serializes the machine state to a file. See [`crate::snapshot`] for
    /// the layout.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotErr> {
        snapshot::save(self, path)
    }

    /// Deserializes a machine from a file previously written by
    /// [`Simulator::save`].
    ///
    /// On failure the error is returned and no machine is produced; a caller
    /// holding an existing `Simulator` keeps it untouched.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotErr> {
        snapshot::load(path)
    }

    /// Reads the raw word at `ip` and advances `ip` past it.
    ///
    /// No interpretation: the word is returned as-is even if it names a
    /// register. Used for opcodes and for destination operands, which are
    /// identities, not values.
    fn fetch_literal(&mut self) -> Result<u16, SimErr> {
        let word = self.mem.read(self.ip)?;
        self.ip = self.ip.wrapping_add(1);
        Ok(word)
    }

    /// Performs a literal fetch, then substitutes register contents if the
    /// fetched word names a register.
    ///
    /// Used for all source-value operands. A word that names neither memory
    /// nor a register is returned unchanged; it only becomes fatal if later
    /// used as an address.
    fn fetch_value(&mut self) -> Result<u16, SimErr> {
        let literal = self.fetch_literal()?;
        match Reg::from_addr(literal) {
            Some(reg) => Ok(self.reg_file[reg]),
            None => Ok(literal),
        }
    }

    /// Routes a write to the backing store the address names: a register slot
    /// if the address is in the register range, the memory cell otherwise.
    fn write_slot(&mut self, addr: u16, val: u16) -> Result<(), SimErr> {
        match Reg::from_addr(addr) {
            Some(reg) => {
                self.reg_file[reg] = val;
                Ok(())
            }
            None => self.mem.write(addr, val),
        }
    }

    /// Executes one decoded instruction. `ip` has already advanced past the
    /// opcode; each operand fetch advances it further.
    fn execute(&mut self, opcode: Opcode) -> Result<Status, SimErr> {
        match opcode {
            Opcode::Halt => return Ok(Status::Halted),
            Opcode::Set => {
                let a = self.fetch_literal()?;
                let b = self.fetch_value()?;
                self.write_slot(a, b)?;
            }
            Opcode::Push => {
                let a = self.fetch_value()?;
                self.stack.push(a);
            }
            Opcode::Pop => {
                // Checked before the operand fetch: an underflowing pop is an
                // architecture violation, unlike ret's halt-on-empty.
                let val = self.stack.pop().ok_or(SimErr::StackUnderflow)?;
                let a = self.fetch_literal()?;
                self.write_slot(a, val)?;
            }
            Opcode::Eq => {
                let a = self.fetch_literal()?;
                let b = self.fetch_value()?;
                let c = self.fetch_value()?;
                self.write_slot(a, u16::from(b == c))?;
            }
            Opcode::Gt => {
                let a = self.fetch_literal()?;
                let b = self.fetch_value()?;
                let c = self.fetch_value()?;
                self.write_slot(a, u16::from(b > c))?;
            }
            Opcode::Jmp => {
                self.ip = self.fetch_value()?;
            }
            Opcode::Jt => {
                let a = self.fetch_value()?;
                let b = self.fetch_value()?;
                if a != 0 {
                    self.ip = b;
                }
            }
            Opcode::Jf => {
                let a = self.fetch_value()?;
                let b = self.fetch_value()?;
                if a == 0 {
                    self.ip = b;
                }
            }
            Opcode::Add => {
                let a = self.fetch_literal()?;
                let b = self.fetch_value()?;
                let c = self.fetch_value()?;
                self.write_slot(a, b.wrapping_add(c) % MODULUS)?;
            }
            Opcode::Mult => {
                let a = self.fetch_literal()?;
                let b = self.fetch_value()?;
                let c = self.fetch_value()?;
                self.write_slot(a, ((u32::from(b) * u32::from(c)) % u32::from(MODULUS)) as u16)?;
            }
            Opcode::Mod => {
                let a = self.fetch_literal()?;
                let b = self.fetch_value()?;
                let c = self.fetch_value()?;
                let rem = b.checked_rem(c).ok_or(SimErr::DivideByZero)?;
                self.write_slot(a, rem)?;
            }
            Opcode::And => {
                let a = self.fetch_literal()?;
                let b = self.fetch_value()?;
                let c = self.fetch_value()?;
                self.write_slot(a, b & c)?;
            }
            Opcode::Or => {
                let a = self.fetch_literal()?;
                let b = self.fetch_value()?;
                let c = self.fetch_value()?;
                self.write_slot(a, b | c)?;
            }
            Opcode::Not => {
                let a = self.fetch_literal()?;
                let b = self.fetch_value()?;
                self.write_slot(a, !b & BIT_MASK_15)?;
            }
            Opcode::Rmem => {
                let a = self.fetch_literal()?;
                let b = self.fetch_value()?;
                let val = self.mem.read(b)?;
                self.write_slot(a, val)?;
            }
            Opcode::Wmem => {
                // The target comes from a value operand slot in the encoding,
                // so it is interpreted, unlike ordinary destinations.
                let a = self.fetch_value()?;
                let b = self.fetch_value()?;
                self.mem.write(a, b)?;
            }
            Opcode::Call => {
                let a = self.fetch_value()?;
                self.stack.push(self.ip);
                self.ip = a;
            }
            Opcode::Ret => match self.stack.pop() {
                Some(addr) => self.ip = addr,
                None => return Ok(Status::Halted),
            },
            Opcode::Out => {
                let a = self.fetch_value()?;
                self.io.push_output(a as u8);
            }
            Opcode::In => {
                if self.io.input().is_empty() {
                    // Rewind over the opcode fetch so the same `in`
                    // re-executes once input arrives.
                    self.ip = self.ip.wrapping_sub(1);
                    return Ok(Status::AwaitingInput);
                }
                let a = self.fetch_literal()?;
                let byte = self.io.pop_input()
                    .unwrap_or_else(|| unreachable!("input queue checked non-empty"));
                self.write_slot(a, u16::from(byte))?;
            }
            Opcode::Noop => {}
        }

        Ok(Status::Running)
    }
}

#[cfg(test)]
mod tests {
    use crate::isa::reg_consts::{R0, R1, R2};

    use super::{SimErr, Simulator, Status};

    #[test]
    fn test_set_and_step() {
        // set r0 = 5, noop
        let mut sim = Simulator::new(&[1, 32768, 5, 21]);

        assert_eq!(sim.step(), Ok(Status::Running));
        assert_eq!(sim.reg(R0), 5);
        assert_eq!(sim.ip(), 3);
        assert_eq!(sim.step(), Ok(Status::Running));
        assert_eq!(sim.ip(), 4);
    }

    #[test]
    fn test_literal_vs_interpreted_destination() {
        // Destination 32768 names register 0...
        let mut sim = Simulator::new(&[1, 32768, 5, 0]);
        sim.run().unwrap();
        assert_eq!(sim.reg(R0), 5);
        assert_eq!(sim.mem().read(0), Ok(1)); // memory untouched

        // ...while destination 5 names memory cell 5, even with registers
        // holding data.
        let mut sim = Simulator::new(&[1, 5, 7, 0, 0, 0]);
        sim.run().unwrap();
        assert_eq!(sim.mem().read(5), Ok(7));
        assert_eq!(sim.reg(R0), 0);
    }

    #[test]
    fn test_wmem_target_is_interpreted() {
        // set r1 = 6, wmem [r1] = 123, halt
        let mut sim = Simulator::new(&[1, 32769, 6, 16, 32769, 123, 0]);
        sim.run().unwrap();
        assert_eq!(sim.mem().read(6), Ok(123));
    }

    #[test]
    fn test_rmem() {
        // rmem r0 = [5], halt, 0, 4660
        let mut sim = Simulator::new(&[15, 32768, 5, 0, 0, 4660]);
        sim.run().unwrap();
        assert_eq!(sim.reg(R0), 4660);
    }

    #[test]
    fn test_arithmetic_is_modular() {
        // add r0 = 32758 + 15
        let mut sim = Simulator::new(&[9, 32768, 32758, 15, 0]);
        sim.run().unwrap();
        assert_eq!(sim.reg(R0), 5);

        // mult r0 = 1234 * 5678
        let mut sim = Simulator::new(&[10, 32768, 1234, 5678, 0]);
        sim.run().unwrap();
        assert_eq!(sim.reg(R0), (1234u32 * 5678 % 32768) as u16);

        // mod r0 = 100 % 7
        let mut sim = Simulator::new(&[11, 32768, 100, 7, 0]);
        sim.run().unwrap();
        assert_eq!(sim.reg(R0), 2);
    }

    #[test]
    fn test_register_operands_are_interpreted() {
        // set r1 = 7, add r0 = r1 + 4, out r0, halt
        let mut sim = Simulator::new(&[1, 32769, 7, 9, 32768, 32769, 4, 19, 32768, 0]);
        sim.run().unwrap();
        assert_eq!(sim.reg(R0), 11);
        assert_eq!(sim.drain_output(), "\u{b}");
    }

    #[test]
    fn test_mod_zero_divisor() {
        let mut sim = Simulator::new(&[11, 32768, 5, 0]);
        assert_eq!(sim.step(), Err(SimErr::DivideByZero));
    }

    #[test]
    fn test_bitwise() {
        // and r0 = 0b1100 & 0b1010; or r1 = 0b1100 | 0b1010
        let mut sim = Simulator::new(&[12, 32768, 12, 10, 13, 32769, 12, 10, 0]);
        sim.run().unwrap();
        assert_eq!(sim.reg(R0), 8);
        assert_eq!(sim.reg(R1), 14);
    }

    #[test]
    fn test_not_is_15_bit_involution() {
        for v in [0u16, 1, 2, 12345, 32766, 32767] {
            // not r0 = !v, not r1 = !r0, halt
            let mut sim = Simulator::new(&[14, 32768, v, 14, 32769, 32768, 0]);
            sim.run().unwrap();
            assert_eq!(sim.reg(R0), !v & 0x7FFF);
            assert_eq!(sim.reg(R1), v);
        }
    }

    #[test]
    fn test_comparisons() {
        // eq r0 = (3 == 3), gt r1 = (7 > 2), eq r2 = (3 == 4)
        let mut sim = Simulator::new(&[4, 32768, 3, 3, 5, 32769, 7, 2, 4, 32770, 3, 4, 0]);
        sim.run().unwrap();
        assert_eq!(sim.reg(R0), 1);
        assert_eq!(sim.reg(R1), 1);
        assert_eq!(sim.reg(R2), 0);
    }

    #[test]
    fn test_jumps() {
        // jmp 4, halt, halt, set r0 = 1, halt
        let mut sim = Simulator::new(&[6, 4, 0, 0, 1, 32768, 1, 0]);
        sim.run().unwrap();
        assert_eq!(sim.reg(R0), 1);

        // jt with a nonzero condition takes the branch
        let mut sim = Simulator::new(&[7, 1, 5, 0, 0, 1, 32768, 2, 0]);
        sim.run().unwrap();
        assert_eq!(sim.reg(R0), 2);

        // jf with a nonzero condition falls through
        let mut sim = Simulator::new(&[8, 1, 5, 0]);
        sim.run().unwrap();
        assert_eq!(sim.ip(), 4);
    }

    #[test]
    fn test_push_pop() {
        // push 99, pop r2, halt
        let mut sim = Simulator::new(&[2, 99, 3, 32770, 0]);
        sim.run().unwrap();
        assert_eq!(sim.reg(R2), 99);
        assert!(sim.stack().is_empty());
    }

    #[test]
    fn test_pop_empty_stack_is_fatal() {
        let mut sim = Simulator::new(&[3, 32768]);
        assert_eq!(sim.step(), Err(SimErr::StackUnderflow));
    }

    #[test]
    fn test_call_and_ret() {
        // call 3, halt, set r0 = 9, ret
        let mut sim = Simulator::new(&[17, 3, 0, 1, 32768, 9, 18]);
        assert_eq!(sim.step(), Ok(Status::Running)); // call
        assert_eq!(sim.ip(), 3);
        assert_eq!(sim.stack(), &[2]); // return address past the operand

        assert_eq!(sim.run(), Ok(Status::Halted));
        assert_eq!(sim.reg(R0), 9);
        assert!(sim.stack().is_empty());
    }

    #[test]
    fn test_ret_empty_stack_halts() {
        // A bare ret behaves exactly like halt, not like an error.
        let mut sim = Simulator::new(&[18]);
        assert_eq!(sim.run(), Ok(Status::Halted));
    }

    #[test]
    fn test_out_and_drain() {
        let mut sim = Simulator::new(&[19, 65, 0]);
        sim.run().unwrap();
        assert_eq!(sim.drain_output(), "A");
        assert_eq!(sim.drain_output(), "");
    }

    #[test]
    fn test_in_starves_then_resumes() {
        // in r0, in r1, in r2, halt
        let mut sim = Simulator::new(&[20, 32768, 20, 32769, 20, 32770, 0]);

        assert_eq!(sim.run(), Ok(Status::AwaitingInput));
        assert_eq!(sim.ip(), 0); // rewound onto the same `in`

        // One buffered line is consumed byte-by-byte, newline included.
        sim.buffer_input("ab");
        assert_eq!(sim.run(), Ok(Status::Halted));
        assert_eq!(sim.reg(R0), u16::from(b'a'));
        assert_eq!(sim.reg(R1), u16::from(b'b'));
        assert_eq!(sim.reg(R2), u16::from(b'\n'));
    }

    #[test]
    fn test_breakpoint_stops_run_before_execution() {
        // Ten noops, then set r0 = 7 at address 10, then halt.
        let mut program = vec![21u16; 10];
        program.extend([1, 32768, 7, 0]);
        let mut sim = Simulator::new(&program);

        sim.add_breakpoint(10);
        assert_eq!(sim.run(), Ok(Status::Breakpoint));
        assert_eq!(sim.ip(), 10);
        assert_eq!(sim.reg(R0), 0); // not executed yet

        // step executes the broken-on instruction...
        assert_eq!(sim.step(), Ok(Status::Running));
        assert_eq!(sim.reg(R0), 7);

        // ...and run proceeds to completion.
        assert_eq!(sim.run(), Ok(Status::Halted));
    }

    #[test]
    fn test_illegal_opcode_is_fatal() {
        let mut sim = Simulator::new(&[22]);
        assert_eq!(sim.step(), Err(SimErr::IllegalOpcode(22)));
    }

    #[test]
    fn test_jump_to_bad_address_is_fatal() {
        // jmp 40000: the jump itself succeeds; the next fetch faults.
        let mut sim = Simulator::new(&[6, 40000]);
        assert_eq!(sim.run(), Err(SimErr::BadAddress(40000)));
    }
}
