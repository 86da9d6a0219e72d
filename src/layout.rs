//! Layout pass: resolves labels, sizes every statement and builds the
//! initial memory image.
//!
//! The pass walks the program once from address 0. Data declarations
//! (`DC`, `DS`) must all come before the first executable statement.
//! Executable statements reserve 2 bytes (RR format) or 4 bytes of
//! instruction placeholders; data declarations reserve 4 bytes per cell.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decoder::{decode, Unrecognized};
use crate::error::PreprocessError;
use crate::instructions::{Format, Mnemonic};
use crate::lexer::tokenize;
use crate::memory::MemoryImage;

/// Type keyword accepted in data declarations.
pub const INTEGER: &str = "INTEGER";

/// One source line and the number of bytes it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub text: String,
    /// 0 until the layout pass sizes the statement.
    pub footprint: usize,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            footprint: 0,
        }
    }

    /// One statement per source line.
    pub fn parse_program(source: &str) -> Vec<Statement> {
        source.lines().map(Statement::new).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    /// 0-based index of the defining statement.
    pub line: usize,
    pub addr: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolTable {
    labels: Vec<Label>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and leaves the table unchanged) if `name` exists.
    pub fn define(&mut self, name: &str, line: usize, addr: u32) -> bool {
        if self.index.contains_key(name) {
            return false;
        }
        self.index.insert(name.to_string(), self.labels.len());
        self.labels.push(Label {
            name: name.to_string(),
            line,
            addr,
        });
        true
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.index.get(name).map(|&i| &self.labels[i])
    }

    pub fn resolve(&self, name: &str) -> Option<u32> {
        self.get(name).map(|l| l.addr)
    }

    /// Labels in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Output of the layout pass, handed to the execution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub statements: Vec<Statement>,
    pub symbols: SymbolTable,
    pub memory: MemoryImage,
}

/// Parsed `DC`/`DS` operand: `count` cells of `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DataSpec {
    count: usize,
    value: i32,
}

fn is_label_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

fn parse_int(line: usize, s: &str) -> Result<i32, PreprocessError> {
    s.parse::<i32>().map_err(|_| PreprocessError::BadNumber {
        line,
        literal: s.to_string(),
    })
}

fn parse_count(line: usize, s: &str) -> Result<usize, PreprocessError> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(PreprocessError::BadNumber {
            line,
            literal: s.to_string(),
        }),
    }
}

/// `INTEGER(v)` or a bare `v`.
fn parse_value(line: usize, s: &str) -> Result<i32, PreprocessError> {
    match s
        .strip_prefix(INTEGER)
        .and_then(|r| r.strip_prefix('('))
        .and_then(|r| r.strip_suffix(')'))
    {
        Some(inner) => parse_int(line, inner.trim()),
        None => parse_int(line, s),
    }
}

fn parse_data(line: usize, op: Mnemonic, operands: &[&str]) -> Result<DataSpec, PreprocessError> {
    let operand = match operands {
        [] => None,
        [one] => Some(*one),
        more => {
            return Err(PreprocessError::BadNumber {
                line,
                literal: more.join(" "),
            })
        }
    };
    match (op, operand) {
        (Mnemonic::Dc, None) => Err(PreprocessError::MissingValue { line }),
        (Mnemonic::Dc, Some(text)) => match text.split_once('*') {
            Some((count, value)) => Ok(DataSpec {
                count: parse_count(line, count)?,
                value: parse_value(line, value)?,
            }),
            None => Ok(DataSpec {
                count: 1,
                value: parse_value(line, text)?,
            }),
        },
        // DS [count][*INTEGER], storage is zeroed
        (_, None) => Ok(DataSpec { count: 1, value: 0 }),
        (_, Some(text)) => {
            let count = match text.split_once('*') {
                Some((count, INTEGER)) => parse_count(line, count)?,
                Some(_) => {
                    return Err(PreprocessError::BadNumber {
                        line,
                        literal: text.to_string(),
                    })
                }
                None if text == INTEGER => 1,
                None => parse_count(line, text)?,
            };
            Ok(DataSpec { count, value: 0 })
        }
    }
}

impl Layout {
    /// Run the layout pass over `statements`, assigning each its footprint.
    pub fn build(mut statements: Vec<Statement>) -> Result<Self, PreprocessError> {
        let mut symbols = SymbolTable::new();
        let mut memory = MemoryImage::with_capacity(statements.len() * 4);
        let mut in_data = true;
        let mut addr: usize = 0;

        for (i, stmt) in statements.iter_mut().enumerate() {
            let line = i + 1;
            let tokens = tokenize(&stmt.text);
            let decoded = match decode(&tokens) {
                Ok(Some(d)) => d,
                Ok(None) => continue,
                Err(Unrecognized(mnemonic)) => {
                    return Err(PreprocessError::UnknownMnemonic {
                        line,
                        mnemonic: mnemonic.to_string(),
                    })
                }
            };

            if let Some(name) = decoded.label {
                if !is_label_name(name) {
                    return Err(PreprocessError::InvalidLabel {
                        line,
                        label: name.to_string(),
                    });
                }
                if !symbols.define(name, i, addr as u32) {
                    return Err(PreprocessError::DuplicateLabel {
                        line,
                        label: name.to_string(),
                    });
                }
                debug!(label = name, addr, line, "label defined");
            }

            let footprint = if decoded.op.format() == Format::Data {
                if !in_data {
                    return Err(PreprocessError::DataAfterCode { line });
                }
                let spec = parse_data(line, decoded.op, decoded.operands)?;
                // every address must stay inside the 32-bit space
                let bytes = spec
                    .count
                    .checked_mul(4)
                    .and_then(|n| addr.checked_add(n))
                    .filter(|&end| u32::try_from(end).is_ok())
                    .map(|end| end - addr)
                    .ok_or_else(|| PreprocessError::BadNumber {
                        line,
                        literal: decoded.operands.join(" "),
                    })?;
                memory.push_words(spec.value, spec.count);
                bytes
            } else {
                in_data = false;
                let width = decoded.op.code_width();
                memory.push_instruction(width);
                width
            };

            stmt.footprint = footprint;
            addr += footprint;
        }

        debug!(
            statements = statements.len(),
            bytes = memory.len(),
            labels = symbols.len(),
            "layout complete"
        );
        Ok(Self {
            statements,
            symbols,
            memory,
        })
    }

    /// Total bytes occupied by all statements.
    pub fn size(&self) -> usize {
        self.statements.iter().map(|s| s.footprint).sum()
    }

    /// See [`statement_at`].
    pub fn statement_at(&self, addr: u32) -> Option<usize> {
        statement_at(&self.statements, addr)
    }
}

/// Map a byte address to the index of the statement starting there.
///
/// The address has to fall exactly on the start of a statement with a
/// non-zero footprint.
pub fn statement_at(statements: &[Statement], addr: u32) -> Option<usize> {
    let addr = addr as usize;
    let mut acc = 0usize;
    for (i, s) in statements.iter().enumerate() {
        if addr < acc {
            return None;
        }
        if addr == acc && s.footprint != 0 {
            return Some(i);
        }
        acc += s.footprint;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Byte;
    use pretty_assertions::assert_eq;

    fn build(src: &str) -> Result<Layout, PreprocessError> {
        Layout::build(Statement::parse_program(src))
    }

    #[test]
    fn data_operand_forms() {
        let d = |op, s: &str| parse_data(1, op, &[s]);
        assert_eq!(d(Mnemonic::Dc, "INTEGER(10)"), Ok(DataSpec { count: 1, value: 10 }));
        assert_eq!(d(Mnemonic::Dc, "INTEGER(-3)"), Ok(DataSpec { count: 1, value: -3 }));
        assert_eq!(d(Mnemonic::Dc, "3*INTEGER(7)"), Ok(DataSpec { count: 3, value: 7 }));
        assert_eq!(d(Mnemonic::Dc, "42"), Ok(DataSpec { count: 1, value: 42 }));
        assert_eq!(d(Mnemonic::Dc, "2*5"), Ok(DataSpec { count: 2, value: 5 }));
        assert_eq!(d(Mnemonic::Ds, "INTEGER"), Ok(DataSpec { count: 1, value: 0 }));
        assert_eq!(d(Mnemonic::Ds, "4*INTEGER"), Ok(DataSpec { count: 4, value: 0 }));
        assert_eq!(d(Mnemonic::Ds, "6"), Ok(DataSpec { count: 6, value: 0 }));
        assert_eq!(parse_data(1, Mnemonic::Ds, &[]), Ok(DataSpec { count: 1, value: 0 }));
    }

    #[test]
    fn malformed_data_operands() {
        assert!(matches!(
            parse_data(4, Mnemonic::Dc, &["INTEGER(x)"]),
            Err(PreprocessError::BadNumber { line: 4, .. })
        ));
        assert!(matches!(
            parse_data(2, Mnemonic::Dc, &["0*INTEGER(1)"]),
            Err(PreprocessError::BadNumber { line: 2, .. })
        ));
        assert_eq!(
            parse_data(9, Mnemonic::Dc, &[]),
            Err(PreprocessError::MissingValue { line: 9 })
        );
        for bad in ["3*garbage", "INTEGERfoo", "2*", "*INTEGER", "2*INTEGER(1)", "INTEGER(0)"] {
            assert!(
                matches!(parse_data(3, Mnemonic::Ds, &[bad]), Err(PreprocessError::BadNumber { line: 3, .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn oversized_declarations_are_rejected_before_allocating() {
        assert_eq!(
            build("X DS 1073741824
Y DC 1").unwrap_err(),
            PreprocessError::BadNumber { line: 1, literal: "1073741824".into() }
        );
        assert_eq!(
            build("X DC 1
Y DS 2000000000").unwrap_err(),
            PreprocessError::BadNumber { line: 2, literal: "2000000000".into() }
        );
        assert!(matches!(
            build("X DS 18446744073709551615*INTEGER"),
            Err(PreprocessError::BadNumber { line: 1, .. })
        ));
    }

    #[test]
    fn footprints_and_addresses() {
        let l = build("ONE DC INTEGER(10)\nARR DS 3*INTEGER\n\nSTART AR 1, 1\n L 2, ONE\n J START").unwrap();
        let fps: Vec<usize> = l.statements.iter().map(|s| s.footprint).collect();
        assert_eq!(fps, vec![4, 12, 0, 2, 4, 4]);
        assert_eq!(l.size(), 26);
        assert_eq!(l.memory.len(), l.size());
        assert_eq!(l.symbols.resolve("ONE"), Some(0));
        assert_eq!(l.symbols.resolve("ARR"), Some(4));
        assert_eq!(l.symbols.resolve("START"), Some(16));
        assert_eq!(l.symbols.get("START").map(|s| s.line), Some(3));
        assert_eq!(l.statement_at(18), Some(4));
        assert_eq!(&l.memory.bytes[..4], &[Byte::Data(0), Byte::Data(0), Byte::Data(0), Byte::Data(10)]);
        assert!(l.memory.bytes[4..16].iter().all(|b| *b == Byte::Data(0)));
        assert!(l.memory.bytes[16..].iter().all(|b| *b == Byte::Instruction));
    }

    #[test]
    fn jump_targets_must_hit_statement_starts() {
        let l = build("AR 1, 1\n\nA 1, 0\nSR 1, 1").unwrap();
        assert_eq!(l.statement_at(0), Some(0));
        // blank line shares address 2 with the A statement
        assert_eq!(l.statement_at(2), Some(2));
        assert_eq!(l.statement_at(6), Some(3));
        assert_eq!(l.statement_at(1), None);
        assert_eq!(l.statement_at(4), None);
        assert_eq!(l.statement_at(8), None);
        assert_eq!(l.statement_at(1000), None);
    }

    #[test]
    fn structural_errors_carry_line_numbers() {
        assert_eq!(
            build("X DC 1\nX DC 2").unwrap_err(),
            PreprocessError::DuplicateLabel { line: 2, label: "X".into() }
        );
        assert_eq!(
            build("A_1 DC 1").unwrap_err(),
            PreprocessError::InvalidLabel { line: 1, label: "A_1".into() }
        );
        assert_eq!(
            build("AR 1, 1\nMVC 1, 2").unwrap_err(),
            PreprocessError::UnknownMnemonic { line: 2, mnemonic: "MVC".into() }
        );
        assert_eq!(
            build("AR 1, 1\nX DC 1").unwrap_err(),
            PreprocessError::DataAfterCode { line: 2 }
        );
    }
}
