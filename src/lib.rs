pub mod cpu;
pub mod decoder;
pub mod error;
pub mod exec;
pub mod instructions;
pub mod interpreter;
pub mod layout;
pub mod lexer;
pub mod listing;
pub mod memory;

pub use cpu::{Cpu, Flags};
pub use error::{Error, PreprocessError, RuntimeError};
pub use interpreter::{Interpreter, InterpreterConfig, Snapshot};
pub use layout::{Label, Layout, Statement, SymbolTable};
pub use memory::{Bus, Byte, MemoryImage};
