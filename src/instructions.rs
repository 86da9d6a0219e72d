use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mnemonic {
    A,
    Ar,
    S,
    Sr,
    M,
    Mr,
    D,
    Dr,
    C,
    Cr,
    L,
    Lr,
    St,
    La,
    J,
    Jp,
    Jz,
    Jn,
    Dc,
    Ds,
}

/// Operand shape of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    /// `r1 , r2`
    Rr,
    /// `r1 , address`
    Rm,
    /// `address`
    Jump,
    /// `DC` / `DS` declarations
    Data,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub op: Mnemonic,
    pub mnemonic: &'static str,
    pub format: Format,
}

pub const TABLE: &[InstrDesc] = &[
    InstrDesc { op: Mnemonic::A, mnemonic: "A", format: Format::Rm },
    InstrDesc { op: Mnemonic::Ar, mnemonic: "AR", format: Format::Rr },
    InstrDesc { op: Mnemonic::S, mnemonic: "S", format: Format::Rm },
    InstrDesc { op: Mnemonic::Sr, mnemonic: "SR", format: Format::Rr },
    InstrDesc { op: Mnemonic::M, mnemonic: "M", format: Format::Rm },
    InstrDesc { op: Mnemonic::Mr, mnemonic: "MR", format: Format::Rr },
    InstrDesc { op: Mnemonic::D, mnemonic: "D", format: Format::Rm },
    InstrDesc { op: Mnemonic::Dr, mnemonic: "DR", format: Format::Rr },
    InstrDesc { op: Mnemonic::C, mnemonic: "C", format: Format::Rm },
    InstrDesc { op: Mnemonic::Cr, mnemonic: "CR", format: Format::Rr },
    InstrDesc { op: Mnemonic::L, mnemonic: "L", format: Format::Rm },
    InstrDesc { op: Mnemonic::Lr, mnemonic: "LR", format: Format::Rr },
    InstrDesc { op: Mnemonic::St, mnemonic: "ST", format: Format::Rm },
    InstrDesc { op: Mnemonic::La, mnemonic: "LA", format: Format::Rm },
    InstrDesc { op: Mnemonic::J, mnemonic: "J", format: Format::Jump },
    InstrDesc { op: Mnemonic::Jp, mnemonic: "JP", format: Format::Jump },
    InstrDesc { op: Mnemonic::Jz, mnemonic: "JZ", format: Format::Jump },
    InstrDesc { op: Mnemonic::Jn, mnemonic: "JN", format: Format::Jump },
    InstrDesc { op: Mnemonic::Dc, mnemonic: "DC", format: Format::Data },
    InstrDesc { op: Mnemonic::Ds, mnemonic: "DS", format: Format::Data },
];

impl Mnemonic {
    /// Exact, case-sensitive lookup in [`TABLE`].
    pub fn lookup(text: &str) -> Option<Self> {
        TABLE.iter().find(|d| d.mnemonic == text).map(|d| d.op)
    }

    pub fn desc(self) -> &'static InstrDesc {
        // rows are in declaration order
        &TABLE[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        self.desc().mnemonic
    }

    pub fn format(self) -> Format {
        self.desc().format
    }

    /// Bytes an executable statement occupies: 2 for RR, 4 otherwise.
    /// Data declarations size themselves from their operand.
    pub fn code_width(self) -> usize {
        match self.format() {
            Format::Rr => 2,
            _ => 4,
        }
    }
}

impl std::fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
