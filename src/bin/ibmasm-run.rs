use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use ibmasm_rs::decoder::decode;
use ibmasm_rs::lexer::tokenize;
use ibmasm_rs::listing::{fmt_decoded, fmt_memory, fmt_registers};
use ibmasm_rs::{Interpreter, InterpreterConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Assemble and run a program on the ibmasm-rs interpreter")]
struct Opts {
    /// Maximum statements to execute before giving up
    #[arg(long)]
    step_limit: Option<usize>,
    /// Interpreter settings as JSON (e.g. {"step_limit": 5000})
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print machine state after every statement
    #[arg(long)]
    step: bool,
    /// Bytes per row in the memory dump
    #[arg(long, default_value_t = 16usize)]
    row: usize,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[arg(value_name = "SOURCE")]
    input: PathBuf,
}

fn load_config(opts: &Opts) -> Result<InterpreterConfig> {
    let mut cfg = match &opts.config {
        Some(path) => {
            let txt = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&txt).with_context(|| format!("parsing {}", path.display()))?
        }
        None => InterpreterConfig::default(),
    };
    if let Some(limit) = opts.step_limit {
        cfg.step_limit = limit;
    }
    Ok(cfg)
}

/// Echo the statement about to run, as `> 3: LOOP AR 1, 2`.
fn trace_statement(interp: &Interpreter) {
    let Some(stmt) = interp.statements().get(interp.current_line()) else {
        return;
    };
    let tokens = tokenize(&stmt.text);
    if let Ok(Some(d)) = decode(&tokens) {
        println!("> {}: {}", interp.current_line() + 1, fmt_decoded(&d));
    }
}

fn report(interp: &Interpreter, opts: &Opts) -> Result<()> {
    match opts.format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&interp.snapshot())?),
        OutputFormat::Text => {
            println!(
                "line {} addr {} steps {}",
                interp.current_line() + 1,
                interp.current_address(),
                interp.steps()
            );
            print!("{}", fmt_registers(interp.cpu()));
            print!("{}", fmt_memory(interp.memory(), opts.row));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let cfg = load_config(&opts)?;
    let source = std::fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;

    let mut interp = Interpreter::with_config(&source, cfg);
    let outcome = if opts.step {
        let mut res: Result<(), ibmasm_rs::Error> = interp.preprocess().map_err(Into::into);
        while res.is_ok() && !interp.is_at_end() {
            if matches!(opts.format, OutputFormat::Text) {
                trace_statement(&interp);
            }
            res = interp.interpret_next_line();
            report(&interp, &opts)?;
        }
        res
    } else {
        interp.interpret()
    };

    if !opts.step {
        report(&interp, &opts)?;
    }
    if let Err(err) = outcome {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
    Ok(())
}
