use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// One memory cell. Instruction cells only reserve space; statements are
/// always decoded from their source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Byte {
    Data(u8),
    Instruction,
}

impl Byte {
    pub fn is_data(self) -> bool {
        matches!(self, Byte::Data(_))
    }

    /// Raw value; instruction placeholders read as 0.
    pub fn raw(self) -> u8 {
        match self {
            Byte::Data(b) => b,
            Byte::Instruction => 0,
        }
    }
}

pub trait Bus {
    fn read_word(&self, addr: u32) -> Result<i32>;
    fn write_word(&mut self, addr: u32, val: i32) -> Result<()>;
}

pub fn encode_word(v: i32) -> [u8; 4] {
    v.to_be_bytes()
}

pub fn decode_word(b: [u8; 4]) -> i32 {
    i32::from_be_bytes(b)
}

/// Byte-addressable program image; address = index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryImage {
    pub bytes: Vec<Byte>,
}

impl MemoryImage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(cap),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn get(&self, addr: usize) -> Option<Byte> {
        self.bytes.get(addr).copied()
    }

    /// Append `count` copies of the big-endian encoding of `v`.
    pub fn push_words(&mut self, v: i32, count: usize) {
        let enc = encode_word(v);
        self.bytes.reserve(count * 4);
        for _ in 0..count {
            self.bytes.extend(enc.iter().map(|&b| Byte::Data(b)));
        }
    }

    /// Append `width` instruction placeholders.
    pub fn push_instruction(&mut self, width: usize) {
        self.bytes
            .extend(std::iter::repeat(Byte::Instruction).take(width));
    }

    fn word_range(&self, addr: u32) -> Result<std::ops::Range<usize>> {
        let off = addr as usize;
        ensure!(
            off.checked_add(4).is_some_and(|end| end <= self.bytes.len()),
            "word at {addr} lies outside the {}-byte image",
            self.bytes.len()
        );
        Ok(off..off + 4)
    }
}

impl Bus for MemoryImage {
    fn read_word(&self, addr: u32) -> Result<i32> {
        let r = self.word_range(addr)?;
        let cells = &self.bytes[r];
        Ok(decode_word([
            cells[0].raw(),
            cells[1].raw(),
            cells[2].raw(),
            cells[3].raw(),
        ]))
    }

    fn write_word(&mut self, addr: u32, val: i32) -> Result<()> {
        let r = self.word_range(addr)?;
        for (cell, b) in self.bytes[r].iter_mut().zip(encode_word(val)) {
            *cell = Byte::Data(b);
        }
        Ok(())
    }
}
