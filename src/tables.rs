//! Opcode and operand field tables.
//!
//! Each table is declared once; the name->pattern and pattern->name lookups are
//! both derived from that single declaration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

macro_rules! bit_table {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $width:literal bits, $family:literal {
            $( $variant:ident = $bits:literal => $text:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $variant, )+
        }

        impl $name {
            pub const WIDTH: u32 = $width;
            pub const FAMILY: &'static str = $family;
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )+ ];

            pub const fn bits(self) -> u32 {
                match self {
                    $( $name::$variant => $bits, )+
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )+
                }
            }

            pub fn from_bits(bits: u32) -> Result<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.bits() == bits)
                    .ok_or(Error::UnknownOpcode { family: $family, bits })
            }

            pub fn lookup(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.name() == name)
            }

            pub fn from_name(name: &str) -> Result<Self> {
                Self::lookup(name).ok_or_else(|| Error::UnknownMnemonic(name.to_string()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

bit_table! {
    pub enum D1Opcode: 2 bits, "D1-bus opcode" {
        Nop = 0b00 => "NOP",
        MovImmDst = 0b01 => "MOV_IMM_DST",
        MovSrcDst = 0b11 => "MOV_SRC_DST",
    }
}

bit_table! {
    /// Sources readable over the D1-bus. `MCn` reads data RAM n and bumps CTn.
    pub enum D1Source: 4 bits, "D1-bus source" {
        Ram0 = 0b0000 => "RAM0",
        Ram1 = 0b0001 => "RAM1",
        Ram2 = 0b0010 => "RAM2",
        Ram3 = 0b0011 => "RAM3",
        Mc0 = 0b0100 => "MC0",
        Mc1 = 0b0101 => "MC1",
        Mc2 = 0b0110 => "MC2",
        Mc3 = 0b0111 => "MC3",
        All = 0b1001 => "ALL",
        Alh = 0b1010 => "ALH",
    }
}

bit_table! {
    pub enum D1Destination: 4 bits, "D1-bus destination" {
        Mc0 = 0b0000 => "MC0",
        Mc1 = 0b0001 => "MC1",
        Mc2 = 0b0010 => "MC2",
        Mc3 = 0b0011 => "MC3",
        Rx = 0b0100 => "RX",
        Pl = 0b0101 => "PL",
        Ra0 = 0b0110 => "RA0",
        Wa0 = 0b0111 => "WA0",
        Lop = 0b1010 => "LOP",
        Top = 0b1011 => "TOP",
        Ct0 = 0b1100 => "CT0",
        Ct1 = 0b1101 => "CT1",
        Ct2 = 0b1110 => "CT2",
        Ct3 = 0b1111 => "CT3",
    }
}

bit_table! {
    pub enum YOpcode: 3 bits, "Y-bus opcode" {
        Nop = 0b000 => "NOP",
        ClrA = 0b001 => "CLR_A",
        MovAluA = 0b010 => "MOV_ALU_A",
        MovSrcA = 0b011 => "MOV_SRC_A",
        MovSrcY = 0b100 => "MOV_SRC_Y",
        // Undocumented: MOV_SRC_Y and MOV_ALU_A issued in the same cycle.
        MovSrcYAluA = 0b110 => "MOV_SRC_Y_ALU_A",
    }
}

bit_table! {
    pub enum XOpcode: 3 bits, "X-bus opcode" {
        Nop = 0b000 => "NOP",
        MovMulP = 0b010 => "MOV_MUL_P",
        MovSrcP = 0b011 => "MOV_SRC_P",
        MovSrcX = 0b100 => "MOV_SRC_X",
        // Undocumented: MOV_SRC_X and MOV_MUL_P issued in the same cycle.
        MovSrcXMulP = 0b110 => "MOV_SRC_X_MUL_P",
    }
}

bit_table! {
    pub enum XySource: 3 bits, "X/Y-bus source" {
        Ram0 = 0b000 => "RAM0",
        Ram1 = 0b001 => "RAM1",
        Ram2 = 0b010 => "RAM2",
        Ram3 = 0b011 => "RAM3",
        Mc0 = 0b100 => "MC0",
        Mc1 = 0b101 => "MC1",
        Mc2 = 0b110 => "MC2",
        Mc3 = 0b111 => "MC3",
    }
}

bit_table! {
    pub enum AluOpcode: 4 bits, "ALU opcode" {
        Nop = 0b0000 => "NOP",
        And = 0b0001 => "AND",
        Or = 0b0010 => "OR",
        Xor = 0b0011 => "XOR",
        Add = 0b0100 => "ADD",
        Sub = 0b0101 => "SUB",
        Ad2 = 0b0110 => "AD2",
        Sr = 0b1000 => "SR",
        Rr = 0b1001 => "RR",
        Sl = 0b1010 => "SL",
        Rl = 0b1011 => "RL",
        Rl8 = 0b1111 => "RL8",
    }
}

bit_table! {
    pub enum EndOpcode: 5 bits, "end opcode" {
        End = 0b11110 => "END",
        Endi = 0b11111 => "ENDI",
    }
}

bit_table! {
    pub enum LoopOpcode: 5 bits, "loop opcode" {
        Btm = 0b11100 => "BTM",
        Lps = 0b11101 => "LPS",
    }
}

bit_table! {
    pub enum DmaRamPointer: 3 bits, "DMA RAM pointer" {
        Mc0 = 0b000 => "MC0",
        Mc1 = 0b001 => "MC1",
        Mc2 = 0b010 => "MC2",
        Mc3 = 0b011 => "MC3",
        Prg = 0b100 => "PRG",
    }
}

bit_table! {
    pub enum DmaCounterRam: 3 bits, "DMA counter RAM" {
        Mc0 = 0b000 => "MC0",
        Mc1 = 0b001 => "MC1",
        Mc2 = 0b010 => "MC2",
        Mc3 = 0b011 => "MC3",
        Ct0 = 0b100 => "CT0",
        Ct1 = 0b101 => "CT1",
        Ct2 = 0b110 => "CT2",
        Ct3 = 0b111 => "CT3",
    }
}

bit_table! {
    pub enum DmaCounterMode: 1 bits, "DMA counter mode" {
        Immediate = 0b0 => "IMMEDIATE",
        Referenced = 0b1 => "REFERENCED",
    }
}

bit_table! {
    pub enum DmaMode: 1 bits, "DMA direction" {
        D0ToRam = 0b0 => "D0_TO_RAM",
        RamToD0 = 0b1 => "RAM_TO_D0",
    }
}

bit_table! {
    pub enum MviDestination: 4 bits, "MVI destination" {
        Mc0 = 0b0000 => "MC0",
        Mc1 = 0b0001 => "MC1",
        Mc2 = 0b0010 => "MC2",
        Mc3 = 0b0011 => "MC3",
        Rx = 0b0100 => "RX",
        Pl = 0b0101 => "PL",
        Ra0 = 0b0110 => "RA0",
        Wa0 = 0b0111 => "WA0",
        Lop = 0b1010 => "LOP",
        Pc = 0b1100 => "PC",
    }
}

bit_table! {
    /// Flag conditions shared by MVI (6 bits) and JMP (7 bits, see
    /// [`Condition::jump_bits`]). Bit 5 set means "flag set", clear means
    /// "flag clear"; the low bits select Z, S, C and T0.
    pub enum Condition: 6 bits, "condition" {
        Nz = 0b000001 => "NZ",
        Ns = 0b000010 => "NS",
        Nzs = 0b000011 => "NZS",
        Nc = 0b000100 => "NC",
        Nt0 = 0b001000 => "NT0",
        Z = 0b100001 => "Z",
        S = 0b100010 => "S",
        Zs = 0b100011 => "ZS",
        C = 0b100100 => "C",
        T0 = 0b101000 => "T0",
    }
}

impl Condition {
    pub const JUMP_WIDTH: u32 = 7;

    /// 7-bit JMP encoding: the MVI pattern behind a set "conditional" bit.
    pub const fn jump_bits(self) -> u32 {
        (1 << Self::WIDTH) | self.bits()
    }

    pub fn from_jump_bits(bits: u32) -> Result<Self> {
        if bits & (1 << Self::WIDTH) == 0 {
            return Err(Error::UnknownOpcode { family: "jump condition", bits });
        }
        Self::from_bits(bits & ((1 << Self::WIDTH) - 1))
            .map_err(|_| Error::UnknownOpcode { family: "jump condition", bits })
    }
}

/// Mask of the low `width` bits.
pub(crate) const fn mask(width: u32) -> u32 {
    if width >= 32 { u32::MAX } else { (1u32 << width) - 1 }
}

/// Extract `width` bits of `word` whose least significant bit sits at `lsb`.
pub(crate) const fn field(word: u32, lsb: u32, width: u32) -> u32 {
    (word >> lsb) & mask(width)
}
