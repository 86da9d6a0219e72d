use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::cpu::{Cpu, Flags, NUM_REGISTERS};
use crate::decoder::{decode, Unrecognized};
use crate::error::{Error, PreprocessError, RuntimeError};
use crate::exec::{Env, Executor, Flow, IntExecutor};
use crate::instructions::Format;
use crate::layout::{Layout, Statement, SymbolTable};
use crate::lexer::tokenize;
use crate::memory::{Byte, MemoryImage};

/// Steps a run may take before it is treated as an infinite loop.
pub const DEFAULT_STEP_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    pub step_limit: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

/// Everything a front end displays after a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub registers: [i32; NUM_REGISTERS],
    pub flags: Flags,
    pub memory: Vec<Byte>,
    /// 0-based index of the next statement.
    pub line: usize,
    pub address: u32,
    pub steps: usize,
    pub at_end: bool,
}

/// One loaded program and the machine running it.
///
/// Loading another program means building another `Interpreter`.
#[derive(Debug, Clone)]
pub struct Interpreter {
    cfg: InterpreterConfig,
    statements: Vec<Statement>,
    symbols: SymbolTable,
    memory: MemoryImage,
    cpu: Cpu,
    index: usize,
    addr: u32,
    steps: usize,
    preprocessed: bool,
}

impl Interpreter {
    pub fn new(source: &str) -> Self {
        Self::with_config(source, InterpreterConfig::default())
    }

    pub fn with_config(source: &str, cfg: InterpreterConfig) -> Self {
        Self {
            cfg,
            statements: Statement::parse_program(source),
            symbols: SymbolTable::new(),
            memory: MemoryImage::new(),
            cpu: Cpu::new(),
            index: 0,
            addr: 0,
            steps: 0,
            preprocessed: false,
        }
    }

    /// Run the layout pass and rewind to the first statement.
    pub fn preprocess(&mut self) -> Result<(), PreprocessError> {
        let layout = Layout::build(self.statements.clone())?;
        self.install(layout);
        Ok(())
    }

    /// Adopt the result of a separately built layout pass.
    pub fn install(&mut self, layout: Layout) {
        self.statements = layout.statements;
        self.symbols = layout.symbols;
        self.memory = layout.memory;
        self.index = 0;
        self.addr = 0;
        self.preprocessed = true;
    }

    /// Lay the program out, then step until it finishes or faults.
    pub fn interpret(&mut self) -> Result<(), Error> {
        self.preprocess()?;
        while !self.is_at_end() {
            self.interpret_next_line()?;
        }
        Ok(())
    }

    /// Execute one statement. Blank lines take a step of their own; data
    /// declarations are passed over on the way to the next statement.
    /// Steps past the end are counted but change nothing else.
    pub fn interpret_next_line(&mut self) -> Result<(), Error> {
        if !self.preprocessed {
            self.preprocess()?;
        }
        if self.is_at_end() {
            self.steps += 1;
            return Ok(());
        }
        if self.steps >= self.cfg.step_limit {
            warn!(limit = self.cfg.step_limit, line = self.index + 1, "step limit reached");
            return Err(RuntimeError::StepLimit {
                line: self.index + 1,
                limit: self.cfg.step_limit,
            }
            .into());
        }
        self.steps += 1;

        while !self.is_at_end() {
            let line = self.index + 1;
            let stmt = &self.statements[self.index];
            let tokens = tokenize(&stmt.text);
            let d = match decode(&tokens) {
                Ok(Some(d)) => d,
                Ok(None) => {
                    self.fall_through();
                    return Ok(());
                }
                Err(Unrecognized(mnemonic)) => {
                    return Err(RuntimeError::UnknownMnemonic {
                        line,
                        mnemonic: mnemonic.to_string(),
                    }
                    .into())
                }
            };
            if d.op.format() == Format::Data {
                self.fall_through();
                continue;
            }

            trace!(line, addr = self.addr, text = %stmt.text, "execute");
            let env = Env {
                line,
                statements: &self.statements,
                symbols: &self.symbols,
            };
            match IntExecutor.exec(&mut self.cpu, &mut self.memory, &env, &d)? {
                Flow::Next => self.fall_through(),
                Flow::Jump { index, addr } => {
                    self.index = index;
                    self.addr = addr;
                }
            }
            return Ok(());
        }
        Ok(())
    }

    fn fall_through(&mut self) {
        self.addr += self.statements[self.index].footprint as u32;
        self.index += 1;
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.statements.len()
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.cfg
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn registers(&self) -> &[i32; NUM_REGISTERS] {
        &self.cpu.gpr
    }

    pub fn flags(&self) -> Flags {
        self.cpu.flags
    }

    pub fn memory(&self) -> &MemoryImage {
        &self.memory
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// 0-based index of the next statement to execute.
    pub fn current_line(&self) -> usize {
        self.index
    }

    pub fn current_address(&self) -> u32 {
        self.addr
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            registers: self.cpu.gpr,
            flags: self.cpu.flags,
            memory: self.memory.bytes.clone(),
            line: self.index,
            address: self.addr,
            steps: self.steps,
            at_end: self.is_at_end(),
        }
    }
}
