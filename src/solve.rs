//! Standalone solvers for the challenge binary's puzzles.
//!
//! Each solver reproduces a computation the hosted program demands of the
//! player, without needing a running machine:
//! - [`coin`]: the five-coin equation in the ruins.
//! - [`teleporter`]: the register-8 confirmation value for the teleporter.
//! - [`orb`]: the weight-tracking path through the vault grid.
//!
//! The outputs are answers to type (or inject with
//! [`crate::sim::Simulator::buffer_input`]) at the program's prompts.

pub mod coin;
pub mod orb;
pub mod teleporter;
