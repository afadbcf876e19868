//! A simulator, debugger, and puzzle toolkit for the Synacor challenge
//! architecture.
//!
//! The architecture is a 15-bit word machine: 32768 memory cells, eight
//! registers addressed as values 32768 through 32775, an unbounded stack,
//! and 22 opcodes. This crate executes program images for it, persists and
//! restores full machine state, disassembles images, and solves the
//! challenge binary's puzzles directly.
//!
//! The crate's modules:
//! - [`isa`]: instruction set definitions (opcodes, registers, constants).
//! - [`sim`]: the execution engine and its debug instrumentation.
//! - [`image`]: loading program images from challenge binaries.
//! - [`snapshot`]: machine-state serialization to a fixed binary layout.
//! - [`disasm`]: a linear disassembler for program images.
//! - [`shell`]: an interactive shell wrapping all of the above.
//! - [`solve`]: standalone solvers for the coin, teleporter, and orb puzzles.
//!
//! # Usage
//!
//! Build a [`sim::Simulator`] around a program image and run it. The machine
//! never touches the console; output is drained from a queue and input is
//! buffered into one, with input starvation reported as a status rather
//! than blocking:
//!
//! ```
//! use synacor_vm::sim::{Simulator, Status};
//!
//! // out 'h', out 'i', in r0, halt
//! let mut sim = Simulator::new(&[19, 104, 19, 105, 20, 32768, 0]);
//!
//! assert_eq!(sim.run().unwrap(), Status::AwaitingInput);
//! assert_eq!(sim.drain_output(), "hi");
//!
//! sim.buffer_input("go");
//! assert_eq!(sim.run().unwrap(), Status::Halted);
//! ```

#![warn(missing_docs)]

pub mod disasm;
pub mod image;
pub mod isa;
pub mod shell;
pub mod sim;
pub mod snapshot;
pub mod solve;
