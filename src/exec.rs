use tracing::trace;

use crate::cpu::{Cpu, NUM_REGISTERS};
use crate::decoder::Decoded;
use crate::error::RuntimeError;
use crate::instructions::{Format, Mnemonic};
use crate::layout::{statement_at, Statement, SymbolTable};
use crate::memory::Bus;

/// Read-only program context for the statement being executed.
#[derive(Debug, Clone, Copy)]
pub struct Env<'a> {
    /// 1-based line of the statement.
    pub line: usize,
    pub statements: &'a [Statement],
    pub symbols: &'a SymbolTable,
}

/// Where execution continues after a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Next,
    Jump { index: usize, addr: u32 },
}

pub trait Executor {
    fn exec<B: Bus>(
        &self,
        cpu: &mut Cpu,
        bus: &mut B,
        env: &Env<'_>,
        d: &Decoded<'_>,
    ) -> Result<Flow, RuntimeError>;
}

/// Signed 32-bit integer semantics.
pub struct IntExecutor;

impl Executor for IntExecutor {
    fn exec<B: Bus>(
        &self,
        cpu: &mut Cpu,
        bus: &mut B,
        env: &Env<'_>,
        d: &Decoded<'_>,
    ) -> Result<Flow, RuntimeError> {
        match d.op.format() {
            Format::Rr => exec_rr(cpu, env, d).map(|_| Flow::Next),
            Format::Rm => exec_rm(cpu, bus, env, d).map(|_| Flow::Next),
            Format::Jump => exec_jump(cpu, env, d),
            // storage is laid out before execution
            Format::Data => Ok(Flow::Next),
        }
    }
}

fn exec_rr(cpu: &mut Cpu, env: &Env<'_>, d: &Decoded<'_>) -> Result<(), RuntimeError> {
    let (t1, t2) = operand_pair(env, d, "`r1 , r2`")?;
    let r1 = parse_reg(env, t1)?;
    let r2 = parse_reg(env, t2)?;
    let a = cpu.gpr[r1];
    let b = cpu.gpr[r2];
    match d.op {
        Mnemonic::Cr => cpu.update_flags(a.wrapping_sub(b)),
        Mnemonic::Lr => cpu.set_result(r1, b),
        op => cpu.set_result(r1, arith(env, op, a, b)?),
    }
    Ok(())
}

fn exec_rm<B: Bus>(
    cpu: &mut Cpu,
    bus: &mut B,
    env: &Env<'_>,
    d: &Decoded<'_>,
) -> Result<(), RuntimeError> {
    let (t1, t2) = operand_pair(env, d, "`r1 , address`")?;
    let r1 = parse_reg(env, t1)?;
    let addr = resolve_addr(cpu, env, t2)?;
    let a = cpu.gpr[r1];
    let bus_fault = |source: anyhow::Error| RuntimeError::Bus {
        line: env.line,
        addr,
        source,
    };
    match d.op {
        Mnemonic::La => cpu.set_result(r1, addr as i32),
        Mnemonic::St => {
            bus.write_word(addr, a).map_err(bus_fault)?;
            cpu.update_flags(a);
        }
        Mnemonic::L => {
            let m = bus.read_word(addr).map_err(bus_fault)?;
            cpu.set_result(r1, m);
        }
        Mnemonic::C => {
            let m = bus.read_word(addr).map_err(bus_fault)?;
            cpu.update_flags(a.wrapping_sub(m));
            // the register's own value decides the final flags
            cpu.update_flags(a);
        }
        op => {
            let m = bus.read_word(addr).map_err(bus_fault)?;
            cpu.set_result(r1, arith(env, op, a, m)?);
        }
    }
    Ok(())
}

fn exec_jump(cpu: &Cpu, env: &Env<'_>, d: &Decoded<'_>) -> Result<Flow, RuntimeError> {
    let &[target] = d.operands else {
        return Err(RuntimeError::Arity {
            line: env.line,
            mnemonic: d.op.as_str(),
            expected: "a single address",
            found: d.operands.len(),
        });
    };
    let addr = resolve_addr(cpu, env, target)?;
    let index = statement_at(env.statements, addr).ok_or(RuntimeError::InvalidJumpTarget {
        line: env.line,
        addr,
    })?;
    let taken = match d.op {
        Mnemonic::Jp => !cpu.sign(),
        Mnemonic::Jn => cpu.sign(),
        Mnemonic::Jz => cpu.zero(),
        _ => true,
    };
    if !taken {
        return Ok(Flow::Next);
    }
    trace!(line = env.line, target, addr, index, "jump taken");
    Ok(Flow::Jump { index, addr })
}

/// Shared arithmetic of the `A`/`S`/`M`/`D` families. Results wrap at
/// 32 bits.
fn arith(env: &Env<'_>, op: Mnemonic, a: i32, b: i32) -> Result<i32, RuntimeError> {
    Ok(match op {
        Mnemonic::A | Mnemonic::Ar => a.wrapping_add(b),
        Mnemonic::S | Mnemonic::Sr => a.wrapping_sub(b),
        Mnemonic::M | Mnemonic::Mr => a.wrapping_mul(b),
        Mnemonic::D | Mnemonic::Dr => {
            floor_div(a, b).ok_or(RuntimeError::DivisionByZero { line: env.line })?
        }
        other => {
            return Err(RuntimeError::UnknownMnemonic {
                line: env.line,
                mnemonic: other.as_str().to_string(),
            })
        }
    })
}

/// Quotient rounded toward negative infinity; `None` on a zero divisor.
pub fn floor_div(a: i32, b: i32) -> Option<i32> {
    if b == 0 {
        return None;
    }
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

/// Split `x , y` operands, checking arity first and then the separator.
fn operand_pair<'t>(
    env: &Env<'_>,
    d: &Decoded<'t>,
    expected: &'static str,
) -> Result<(&'t str, &'t str), RuntimeError> {
    let &[first, sep, second] = d.operands else {
        return Err(RuntimeError::Arity {
            line: env.line,
            mnemonic: d.op.as_str(),
            expected,
            found: d.operands.len(),
        });
    };
    if sep != "," {
        return Err(RuntimeError::MissingComma {
            line: env.line,
            found: sep.to_string(),
        });
    }
    Ok((first, second))
}

fn parse_reg(env: &Env<'_>, tok: &str) -> Result<usize, RuntimeError> {
    match tok.parse::<usize>() {
        Ok(r) if r < NUM_REGISTERS => Ok(r),
        _ => Err(RuntimeError::InvalidRegister {
            line: env.line,
            token: tok.to_string(),
        }),
    }
}

/// Resolve an address operand: a decimal address, `0(r)` for the value
/// held in register `r`, or a label.
pub fn resolve_addr(cpu: &Cpu, env: &Env<'_>, tok: &str) -> Result<u32, RuntimeError> {
    if !tok.is_empty() && tok.bytes().all(|b| b.is_ascii_digit()) {
        // too large to fit is still an address, just never a mapped one
        return Ok(tok.parse::<u32>().unwrap_or(u32::MAX));
    }
    if let Some(reg) = tok.strip_prefix("0(").and_then(|r| r.strip_suffix(')')) {
        let r = parse_reg(env, reg)?;
        return Ok(cpu.gpr[r] as u32);
    }
    env.symbols
        .resolve(tok)
        .ok_or_else(|| RuntimeError::UndefinedLabel {
            line: env.line,
            label: tok.to_string(),
        })
}
