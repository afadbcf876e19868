//! An interactive shell for driving machines.
//!
//! The shell owns one [`Simulator`] at a time plus the program image used to
//! create fresh ones. Its command language splits in two:
//! - Lines starting with `--` are passed through to the machine's input
//!   queue, the machine is run, and its output is printed. This is how the
//!   hosted program is actually played.
//! - Everything else is a shell command (`run`, `step`, `save`, breakpoint
//!   management, the puzzle solvers; `help` lists them all).
//!
//! Console input arrives through [`crate::sim::io::LinePump`], so the shell
//! itself never blocks the machine: input starvation surfaces as a status,
//! not a hang.

use crate::disasm;
use crate::sim::io::LinePump;
use crate::sim::{Simulator, Status};
use crate::solve::{coin, orb, teleporter};

const PASS_THRU_PREFIX: &str = "--";

/// The interactive shell. See the [module docs](self) for the command model.
pub struct Shell {
    sim: Simulator,
    image: Vec<u16>,
    lines: LinePump,
}

impl Shell {
    /// Creates a shell whose machines run the given program image.
    pub fn new(image: Vec<u16>) -> Self {
        Self {
            sim: Simulator::new(&image),
            image,
            lines: LinePump::stdin(),
        }
    }

    /// Runs the shell until `quit` or end of console input.
    pub fn start(&mut self) {
        log("Synacor shell started.");
        log("- Type 'help' for cmd listing");
        log("- Type 'quit' to quit");
        log("- Commands prepended with '--' are passed thru to the machine's input buffer");
        log("");

        while let Some(input) = self.lines.read_line() {
            let input = input.trim_end();
            if input == "quit" {
                break;
            }
            if let Some(text) = input.strip_prefix(PASS_THRU_PREFIX) {
                self.sim.buffer_input(text);
                self.run_machine();
                continue;
            }

            let (cmd, arg) = match input.split_once(' ') {
                Some((cmd, arg)) => (cmd, arg.trim()),
                None => (input, ""),
            };
            if cmd.is_empty() {
                continue;
            }
            self.dispatch(cmd, arg);
        }

        log("Synacor shell ended.");
    }

    fn dispatch(&mut self, cmd: &str, arg: &str) {
        match cmd {
            "help" => help(),
            "new" => {
                self.sim = Simulator::new(&self.image);
                log("new machine created");
            }
            "run" => self.run_machine(),
            "step" => match self.sim.step() {
                Ok(status) => {
                    print_output(&self.sim.drain_output());
                    self.report(status);
                }
                Err(e) => log(&format!("machine fault: {e}")),
            },
            "save" => match self.sim.save(arg) {
                Ok(()) => log(&format!("machine state saved to {arg}")),
                Err(e) => log(&format!("save failed: {e}")),
            },
            "load" => match Simulator::load(arg) {
                Ok(sim) => {
                    self.sim = sim;
                    log(&format!("machine state loaded from {arg}"));
                }
                Err(e) => log(&format!("load failed: {e}")),
            },
            "state" => log(&self.sim.dump_state()),
            "ip" => match parse_word(arg) {
                Some(addr) => self.sim.set_ip(addr),
                None => log(&format!("expected an address, got [{arg}]")),
            },
            "reg" => match arg.split_once(' ').map(|(r, v)| (parse_word(r), parse_word(v.trim()))) {
                Some((Some(reg), Some(val))) => {
                    if let Err(e) = self.sim.set_reg(reg, val) {
                        log(&format!("cannot set register: {e}"));
                    }
                }
                _ => log("usage: reg <register> <value>"),
            },
            "bp" => match parse_word(arg) {
                Some(addr) => self.sim.add_breakpoint(addr),
                None => log(&format!("expected an address, got [{arg}]")),
            },
            "bp-clear" => match parse_word(arg) {
                Some(addr) => self.sim.clear_breakpoint(addr),
                None => log(&format!("expected an address, got [{arg}]")),
            },
            "dis" => match std::fs::write(arg, disasm::disassemble(self.sim.mem().as_slice())) {
                Ok(()) => log(&format!("disassembly written to {arg}")),
                Err(e) => log(&format!("disassembly failed: {e}")),
            },
            "solve-coin" => match coin::solve() {
                Some(coins) => log(&coins.join(", ")),
                None => log("no coin order satisfies the equation"),
            },
            "solve-teleporter" => {
                log("solving teleporter puzzle, this will take a while...");
                match teleporter::solve() {
                    Some(r8) => log(&r8.to_string()),
                    None => log("no register value passes confirmation"),
                }
            }
            "solve-orb" => match orb::solve() {
                Some(path) => log(&path.join("\n")),
                None => log("no path reaches the vault at the required weight"),
            },
            _ => log(&format!("Command not recognized [{cmd}]")),
        }
    }

    /// Runs the machine to its next stop, printing its output verbatim and
    /// the stop reason in shell green.
    fn run_machine(&mut self) {
        match self.sim.run() {
            Ok(status) => {
                print_output(&self.sim.drain_output());
                self.report(status);
            }
            Err(e) => log(&format!("machine fault: {e}")),
        }
    }

    fn report(&self, status: Status) {
        match status {
            Status::Running => {}
            Status::Halted => log("machine halted"),
            Status::Breakpoint => log(&format!("breakpoint hit at ip {}", self.sim.ip())),
            Status::AwaitingInput => log("machine awaiting input"),
        }
    }
}

fn help() {
    log("Available commands:");
    log("-help: print all available commands");
    log("-quit: quit the shell");
    log("-new: create a new machine, loaded with the program image");
    log("-run: run the current machine until it stops");
    log("-step: execute exactly one instruction");
    log("-save: serialize the current machine state to the specified path");
    log("-load: replace the current machine with one loaded from the specified path");
    log("-state: print the current machine state");
    log("-ip: set the instruction pointer to the specified address");
    log("-reg: set the specified register to the specified value");
    log("-bp: add a breakpoint at the specified address");
    log("-bp-clear: remove the breakpoint at the specified address");
    log("-dis: write a disassembly of the machine's memory to the specified path");
    log("-solve-coin: solve the coin puzzle and print the solution");
    log("-solve-teleporter: solve the teleporter puzzle and print the solution");
    log("-solve-orb: solve the orb puzzle and print the solution");
}

fn parse_word(text: &str) -> Option<u16> {
    text.parse().ok()
}

/// Prints machine output verbatim, flushed so it lands before the next
/// blocking read even without a trailing newline.
fn print_output(text: &str) {
    use std::io::Write;

    print!("{text}");
    let _ = std::io::stdout().flush();
}

/// Shell output is green to distinguish it from the machine's own output.
fn log(line: &str) {
    println!("\x1b[32m{line}\x1b[0m");
}
