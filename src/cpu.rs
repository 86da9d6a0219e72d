use bitflags::bitflags;
use serde::{Deserialize, Serialize};

pub const NUM_REGISTERS: usize = 16;

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags: u8 {
const ZERO = 1 << 0;
const SIGN = 1 << 1;
}
}

impl Flags {
    /// Condition bits for a result value.
    pub fn of(v: i32) -> Self {
        let mut f = Flags::empty();
        f.set(Flags::ZERO, v == 0);
        f.set(Flags::SIGN, v < 0);
        f
    }
}

/// Register file plus condition flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    pub gpr: [i32; NUM_REGISTERS],
    pub flags: Flags,
}

impl Default for Flags {
    fn default() -> Self {
        Flags::empty()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute both flags from `v`; never toggles a single bit.
    pub fn update_flags(&mut self, v: i32) {
        self.flags = Flags::of(v);
    }

    /// Write `v` to register `r` and recompute flags from it.
    pub fn set_result(&mut self, r: usize, v: i32) {
        self.gpr[r] = v;
        self.update_flags(v);
    }

    pub fn zero(&self) -> bool {
        self.flags.contains(Flags::ZERO)
    }

    pub fn sign(&self) -> bool {
        self.flags.contains(Flags::SIGN)
    }
}
