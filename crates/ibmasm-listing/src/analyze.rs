use serde::Serialize;

use ibmasm_rs::decoder::decode;
use ibmasm_rs::instructions::{Format, Mnemonic};
use ibmasm_rs::lexer::tokenize;
use ibmasm_rs::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Fallthrough,
    Branch,
    CondBranch,
}

/// Control-flow edge between statement indices (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub kind: EdgeKind,
}

/// A jump whose target cannot be decided without running the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unresolved {
    pub from: usize,
    pub target: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub edges: Vec<Edge>,
    pub unresolved: Vec<Unresolved>,
}

fn static_target(layout: &Layout, tok: &str) -> Result<usize, &'static str> {
    let addr = if tok.bytes().all(|b| b.is_ascii_digit()) {
        tok.parse::<u32>().map_err(|_| "address out of range")?
    } else if tok.starts_with("0(") {
        return Err("register-indirect");
    } else {
        layout.symbols.resolve(tok).ok_or("undefined label")?
    };
    layout.statement_at(addr).ok_or("not a statement boundary")
}

/// Build the static jump graph of executable statements.
pub fn analyze(layout: &Layout) -> Report {
    let mut report = Report::default();
    let n = layout.statements.len();
    for (i, s) in layout.statements.iter().enumerate() {
        let tokens = tokenize(&s.text);
        let Ok(Some(d)) = decode(&tokens) else { continue };
        let falls = d.op != Mnemonic::J;
        if d.op.format() == Format::Jump {
            let kind = if d.op == Mnemonic::J { EdgeKind::Branch } else { EdgeKind::CondBranch };
            match d.operands {
                [target] => match static_target(layout, target) {
                    Ok(to) => report.edges.push(Edge { from: i, to, kind }),
                    Err(reason) => report.unresolved.push(Unresolved {
                        from: i,
                        target: target.to_string(),
                        reason,
                    }),
                },
                _ => report.unresolved.push(Unresolved {
                    from: i,
                    target: d.operands.join(" "),
                    reason: "malformed operands",
                }),
            }
        }
        if falls && i + 1 < n {
            report.edges.push(Edge { from: i, to: i + 1, kind: EdgeKind::Fallthrough });
        }
    }
    report
}
