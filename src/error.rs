//! Error types. Every variant carries the 1-based source line it refers to.

/// Structural problems found by the layout pass, before anything runs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PreprocessError {
    #[error("line {line}: label `{label}` is already defined")]
    DuplicateLabel { line: usize, label: String },
    #[error("line {line}: label `{label}` must be alphanumeric")]
    InvalidLabel { line: usize, label: String },
    #[error("line {line}: unrecognized instruction `{mnemonic}`")]
    UnknownMnemonic { line: usize, mnemonic: String },
    #[error("line {line}: data declarations must precede executable code")]
    DataAfterCode { line: usize },
    #[error("line {line}: malformed numeric literal `{literal}`")]
    BadNumber { line: usize, literal: String },
    #[error("line {line}: DC requires a value")]
    MissingValue { line: usize },
}

impl PreprocessError {
    pub fn line(&self) -> usize {
        match self {
            Self::DuplicateLabel { line, .. }
            | Self::InvalidLabel { line, .. }
            | Self::UnknownMnemonic { line, .. }
            | Self::DataAfterCode { line }
            | Self::BadNumber { line, .. }
            | Self::MissingValue { line } => *line,
        }
    }
}

/// Faults raised while executing a statement.
#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    #[error("line {line}: {mnemonic} expects {expected}, found {found} operand token(s)")]
    Arity {
        line: usize,
        mnemonic: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("line {line}: expected `,` between operands, found `{found}`")]
    MissingComma { line: usize, found: String },
    #[error("line {line}: invalid register `{token}`")]
    InvalidRegister { line: usize, token: String },
    #[error("line {line}: undefined symbol `{label}`")]
    UndefinedLabel { line: usize, label: String },
    #[error("line {line}: invalid jump target {addr}")]
    InvalidJumpTarget { line: usize, addr: u32 },
    #[error("line {line}: unrecognized instruction `{mnemonic}`")]
    UnknownMnemonic { line: usize, mnemonic: String },
    #[error("line {line}: division by zero")]
    DivisionByZero { line: usize },
    #[error("line {line}: memory fault at {addr}: {source}")]
    Bus {
        line: usize,
        addr: u32,
        #[source]
        source: anyhow::Error,
    },
    #[error("line {line}: execution limit of {limit} steps exceeded, possible infinite loop")]
    StepLimit { line: usize, limit: usize },
}

impl RuntimeError {
    pub fn line(&self) -> usize {
        match self {
            Self::Arity { line, .. }
            | Self::MissingComma { line, .. }
            | Self::InvalidRegister { line, .. }
            | Self::UndefinedLabel { line, .. }
            | Self::InvalidJumpTarget { line, .. }
            | Self::UnknownMnemonic { line, .. }
            | Self::DivisionByZero { line }
            | Self::Bus { line, .. }
            | Self::StepLimit { line, .. } => *line,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("preprocessing error: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn line(&self) -> usize {
        match self {
            Self::Preprocess(e) => e.line(),
            Self::Runtime(e) => e.line(),
        }
    }
}
