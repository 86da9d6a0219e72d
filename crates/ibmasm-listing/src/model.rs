use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use ibmasm_rs::{Byte, Layout, Statement};

/// One listing row: a statement with its address and the bytes it owns.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    /// 1-based source line.
    pub line: usize,
    pub addr: u32,
    pub footprint: usize,
    pub bytes: Vec<Byte>,
    pub text: String,
}

pub fn load_source(path: &Path) -> Result<Layout> {
    let text = std::fs::read_to_string(path)?;
    layout_source(&text)
}

pub fn layout_source(text: &str) -> Result<Layout> {
    Ok(Layout::build(Statement::parse_program(text))?)
}

pub fn rows(layout: &Layout) -> Vec<Row> {
    let mut out = Vec::with_capacity(layout.statements.len());
    let mut addr = 0usize;
    for (i, s) in layout.statements.iter().enumerate() {
        let end = addr + s.footprint;
        out.push(Row {
            line: i + 1,
            addr: addr as u32,
            footprint: s.footprint,
            bytes: layout.memory.bytes[addr..end].to_vec(),
            text: s.text.clone(),
        });
        addr = end;
    }
    out
}
