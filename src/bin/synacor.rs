//! Command-line entry point: load a program image and start the shell, or
//! dump a disassembly.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use synacor_vm::shell::Shell;
use synacor_vm::{disasm, image};

/// A virtual machine, debugger, and puzzle toolkit for the Synacor challenge
/// architecture.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the program image (a flat little-endian binary)
    image: PathBuf,

    /// Write a disassembly of the image to this path instead of starting
    /// the shell
    #[arg(long, value_name = "PATH")]
    dis: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let program = match image::read_image(&args.image) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("error: cannot load {}: {e}", args.image.display());
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = args.dis {
        return match std::fs::write(&path, disasm::disassemble(&program)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: cannot write {}: {e}", path.display());
                ExitCode::FAILURE
            }
        };
    }

    let mut shell = Shell::new(program);
    shell.start();
    ExitCode::SUCCESS
}
