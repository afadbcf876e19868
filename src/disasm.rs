//! A linear disassembler for program images.
//!
//! This walks an image from address 0, decoding each word as an opcode and
//! consuming its operands. Words that are not valid opcodes (data, strings)
//! produce no line and are skipped one word at a time, so decoding
//! resynchronizes at the next instruction boundary.
//!
//! ```
//! use synacor_vm::disasm::disassemble;
//!
//! let listing = disassemble(&[19, 65, 0]);
//! assert_eq!(listing.lines().next().unwrap(), "0:      out       A");
//! ```

use std::fmt::Write;

use crate::isa::{Opcode, Reg};

/// Renders a program image as a text listing, one instruction per line.
///
/// Each line is `addr:` left-aligned in 7 columns, the mnemonic right-aligned
/// in 4, then each operand right-aligned in 8. Register operands render as
/// `reg[n]`; the operand of `out` renders as its character (with the newline
/// escaped); everything else renders as a decimal number.
pub fn disassemble(program: &[u16]) -> String {
    let mut out = String::new();
    let mut adr = 0;

    while adr < program.len() {
        let Some(opcode) = Opcode::from_word(program[adr]) else {
            // Not an instruction; resynchronize at the next word.
            adr += 1;
            continue;
        };
        let argc = opcode.arg_count();
        if adr + argc >= program.len() {
            // Truncated trailing instruction.
            break;
        }

        let _ = write!(out, "{:<7}{:>4}", format!("{adr}:"), opcode.mnemonic());
        for &arg in &program[adr + 1..=adr + argc] {
            let _ = write!(out, "{:>8}", format_arg(arg, opcode));
        }
        out.push('\n');

        adr += argc + 1;
    }

    out
}

fn format_arg(val: u16, opcode: Opcode) -> String {
    if let Some(reg) = Reg::from_addr(val) {
        return format!("reg[{}]", reg.reg_no());
    }
    if opcode == Opcode::Out {
        return match val as u8 as char {
            '\n' => "\\n".to_string(),
            c => c.to_string(),
        };
    }
    val.to_string()
}
