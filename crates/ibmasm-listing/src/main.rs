use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::PathBuf;

use ibmasm_listing::{analyze, load_source, rows, EdgeKind, Row};
use ibmasm_rs::listing::fmt_byte;
use ibmasm_rs::{Label, Layout};

#[derive(Parser, Debug)]
#[command(author, version, about = "Listing and jump-graph tool for ibmasm programs", long_about = None)]
struct Cli {
    /// Input source path
    #[arg(value_name = "SOURCE")]
    input: PathBuf,
    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Address, footprint and source text of every statement
    Layout {
        /// Show the bytes each statement occupies
        #[arg(long)]
        show_bytes: bool,
    },
    /// Labels with their addresses
    Symbols,
    /// Static control-flow edges between statements
    Flow,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn layout_text(rows: &[Row], show_bytes: bool) -> String {
    let mut buf = String::new();
    for r in rows {
        let _ = write!(buf, "{:>4} {:>6} {:>3}  ", r.line, r.addr, r.footprint);
        if show_bytes {
            let bytes: Vec<String> = r.bytes.iter().take(8).map(|&b| fmt_byte(b)).collect();
            let more = if r.bytes.len() > 8 { " +" } else { "" };
            let _ = write!(buf, "{:<26}", format!("{}{more}", bytes.join(" ")));
        }
        let _ = writeln!(buf, "{}", r.text);
    }
    buf
}

fn symbols_text(layout: &Layout) -> String {
    let mut buf = String::new();
    for l in layout.symbols.iter() {
        let _ = writeln!(buf, "{:<12} {:>6}  line {}", l.name, l.addr, l.line + 1);
    }
    buf
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let layout = load_source(&cli.input)?;

    let output = match (&cli.cmd, cli.format) {
        (Command::Layout { .. }, OutputFormat::Json) => serde_json::to_string_pretty(&rows(&layout))?,
        (Command::Layout { show_bytes }, OutputFormat::Text) => layout_text(&rows(&layout), *show_bytes),
        (Command::Symbols, OutputFormat::Json) => {
            let labels: Vec<&Label> = layout.symbols.iter().collect();
            serde_json::to_string_pretty(&labels)?
        }
        (Command::Symbols, OutputFormat::Text) => symbols_text(&layout),
        (Command::Flow, OutputFormat::Json) => serde_json::to_string_pretty(&analyze(&layout))?,
        (Command::Flow, OutputFormat::Text) => {
            let report = analyze(&layout);
            let mut buf = String::new();
            for e in &report.edges {
                let kind = match e.kind {
                    EdgeKind::Fallthrough => "ft",
                    EdgeKind::Branch => "br",
                    EdgeKind::CondBranch => "cbr",
                };
                let _ = writeln!(buf, "  {:>4} -> {:>4} ({kind})", e.from + 1, e.to + 1);
            }
            for u in &report.unresolved {
                let _ = writeln!(buf, "  {:>4} -> ? {} ({})", u.from + 1, u.target, u.reason);
            }
            buf
        }
    };

    if let Some(path) = cli.out {
        std::fs::write(path, output)?;
    } else {
        print!("{output}");
        if matches!(cli.format, OutputFormat::Json) {
            println!();
        }
    }
    Ok(())
}
