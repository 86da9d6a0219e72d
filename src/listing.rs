use std::fmt::Write as _;

use crate::cpu::{Cpu, Flags};
use crate::decoder::Decoded;
use crate::memory::{Byte, MemoryImage};

/// Canonical text of a decoded statement, e.g. `LOOP AR 1, 2`.
pub fn fmt_decoded(d: &Decoded) -> String {
    let mut out = String::new();
    if let Some(label) = d.label {
        out.push_str(label);
        out.push(' ');
    }
    out.push_str(d.op.as_str());
    for tok in d.operands {
        if *tok == "," {
            out.push(',');
        } else {
            out.push(' ');
            out.push_str(tok);
        }
    }
    out
}

pub fn fmt_flags(f: Flags) -> String {
    format!(
        "Z={} S={}",
        u8::from(f.contains(Flags::ZERO)),
        u8::from(f.contains(Flags::SIGN))
    )
}

/// Four registers per row followed by the flags.
pub fn fmt_registers(cpu: &Cpu) -> String {
    let mut out = String::new();
    for (i, row) in cpu.gpr.chunks(4).enumerate() {
        for (j, v) in row.iter().enumerate() {
            let _ = write!(out, "R{:<2} = {:>11}  ", i * 4 + j, v);
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "{}", fmt_flags(cpu.flags));
    out
}

/// Two hex digits for a data byte, `..` for an instruction placeholder.
pub fn fmt_byte(b: Byte) -> String {
    match b {
        Byte::Data(v) => format!("{v:02x}"),
        Byte::Instruction => "..".to_string(),
    }
}

/// Hex dump, `per_row` bytes per row. Instruction placeholders print as `..`.
pub fn fmt_memory(mem: &MemoryImage, per_row: usize) -> String {
    let per_row = per_row.max(1);
    let mut out = String::new();
    for (row, cells) in mem.bytes.chunks(per_row).enumerate() {
        let _ = write!(out, "{:04}:", row * per_row);
        for &b in cells {
            let _ = write!(out, " {}", fmt_byte(b));
        }
        let _ = writeln!(out);
    }
    out
}
