//! Debug instrumentation for the simulator.
//!
//! Everything here operates on a paused [`Simulator`]: breakpoint management,
//! direct patches to the instruction pointer and registers, and a
//! human-readable state dump. Memory and the stack are deliberately not
//! patchable from outside; the instruction set is the only way to mutate
//! them.
//!
//! ```
//! use synacor_vm::sim::{Simulator, Status};
//!
//! let mut sim = Simulator::new(&[21, 21, 21, 0]);
//! sim.add_breakpoint(2);
//!
//! assert_eq!(sim.run().unwrap(), Status::Breakpoint);
//! assert_eq!(sim.ip(), 2);
//! ```

use std::fmt::Write;

use crate::isa::{Opcode, Reg, MAX_REG, MIN_REG, MODULUS, NUM_REGS};

use super::{SimErr, Simulator};

impl Simulator {
    /// Sets the instruction pointer.
    ///
    /// Any address is accepted; an out-of-range one only faults on the next
    /// fetch, the same as a wild `jmp`.
    pub fn set_ip(&mut self, addr: u16) {
        self.ip = addr;
    }

    /// Sets a register, accepting either the register's index (`0`–`7`) or
    /// its architectural address (`32768`–`32775`).
    ///
    /// The value is reduced modulo 32768, preserving the invariant that a
    /// register never holds more than 15 bits.
    pub fn set_reg(&mut self, reg: u16, val: u16) -> Result<(), SimErr> {
        let reg = match reg {
            0..=7 => Reg(reg as u8),
            MIN_REG..=MAX_REG => match Reg::from_addr(reg) {
                Some(r) => r,
                None => return Err(SimErr::BadRegister(reg)),
            },
            _ => return Err(SimErr::BadRegister(reg)),
        };
        self.reg_file[reg] = val % MODULUS;
        Ok(())
    }

    /// Adds a breakpoint at the given address.
    ///
    /// Idempotent. [`Simulator::run`] stops with [`super::Status::Breakpoint`]
    /// when the instruction pointer reaches the address, before executing the
    /// instruction there; [`Simulator::step`] ignores breakpoints entirely.
    pub fn add_breakpoint(&mut self, addr: u16) {
        self.breakpoints.insert(addr);
    }

    /// Removes a breakpoint. Removing an absent breakpoint is a no-op.
    pub fn clear_breakpoint(&mut self, addr: u16) {
        self.breakpoints.remove(&addr);
    }

    /// The current breakpoint addresses, in ascending order.
    pub fn breakpoints(&self) -> Vec<u16> {
        let mut bps: Vec<_> = self.breakpoints.iter().copied().collect();
        bps.sort_unstable();
        bps
    }

    /// Renders a human-readable summary of the machine state: the instruction
    /// pointer (with the mnemonic at that address), all registers, the stack
    /// bottom-to-top, and both I/O queues.
    ///
    /// Memory contents are excluded; use [`crate::disasm`] to inspect those.
    pub fn dump_state(&self) -> String {
        let mut out = String::new();

        let mnemonic = self.mem
            .read(self.ip)
            .ok()
            .and_then(Opcode::from_word)
            .map_or("???", Opcode::mnemonic);
        let _ = writeln!(out, "ip: {} ({mnemonic})", self.ip);

        for n in 0..NUM_REGS as u8 {
            let reg = Reg(n);
            let _ = writeln!(out, "{reg}: {}", self.reg_file[reg]);
        }

        let _ = writeln!(out, "stack: {:?}", self.stack);
        let _ = writeln!(out, "input: {:?}", queue_text(self.io.input()));
        let _ = write!(out, "output: {:?}", queue_text(self.io.output()));

        out
    }
}

/// Renders a byte queue as text for the state dump.
fn queue_text(queue: &std::collections::VecDeque<u8>) -> String {
    queue.iter().map(|&b| char::from(b)).collect()
}
