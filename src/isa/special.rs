//! Commands that occupy a whole instruction word on their own.

use serde::{Deserialize, Serialize};

use crate::codec::{check_range, sign_ext, Codec};
use crate::context::SymbolContext;
use crate::error::{Error, Result};
use crate::tables::{
    field, mask, Condition, DmaCounterMode, DmaCounterRam, DmaMode, DmaRamPointer, EndOpcode, LoopOpcode,
    MviDestination,
};

const WORD: u32 = 32;

fn wrong_arity(tokens: &[&str]) -> Error {
    let mn = tokens.first().copied().unwrap_or_default();
    Error::malformed(mn, format!("unexpected operand count {}", tokens.len().saturating_sub(1)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndCommand {
    pub opcode: EndOpcode,
}

impl Codec for EndCommand {
    const WIDTH: u32 = WORD;

    fn decode(bits: u32) -> Result<Self> {
        Ok(Self { opcode: EndOpcode::from_bits(field(bits, WORD - EndOpcode::WIDTH, EndOpcode::WIDTH))? })
    }

    fn encode(&self) -> u32 {
        self.opcode.bits() << (WORD - EndOpcode::WIDTH)
    }

    fn parse(tokens: &[&str], _ctx: &SymbolContext) -> Result<Self> {
        match tokens {
            [mn] => EndOpcode::lookup(mn)
                .map(|opcode| Self { opcode })
                .ok_or_else(|| Error::malformed(*mn, "not an END command")),
            _ => Err(wrong_arity(tokens)),
        }
    }

    fn render(&self) -> Vec<String> {
        vec![self.opcode.name().to_string()]
    }
}

/// `BTM` (bottom of loop) and `LPS` (loop single instruction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopCommand {
    pub opcode: LoopOpcode,
}

impl Codec for LoopCommand {
    const WIDTH: u32 = WORD;

    fn decode(bits: u32) -> Result<Self> {
        Ok(Self { opcode: LoopOpcode::from_bits(field(bits, WORD - LoopOpcode::WIDTH, LoopOpcode::WIDTH))? })
    }

    fn encode(&self) -> u32 {
        self.opcode.bits() << (WORD - LoopOpcode::WIDTH)
    }

    fn parse(tokens: &[&str], _ctx: &SymbolContext) -> Result<Self> {
        match tokens {
            [mn] => LoopOpcode::lookup(mn)
                .map(|opcode| Self { opcode })
                .ok_or_else(|| Error::malformed(*mn, "not a loop command")),
            _ => Err(wrong_arity(tokens)),
        }
    }

    fn render(&self) -> Vec<String> {
        vec![self.opcode.name().to_string()]
    }
}

/// Transfer length: an 8-bit literal, or read from a data RAM / counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DmaCounter {
    Immediate(u8),
    Referenced(DmaCounterRam),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmaCommand {
    /// `DMAH`: hold the external address after the transfer.
    pub hold: bool,
    pub address_add_mode: u8,
    pub dma_mode: DmaMode,
    pub ram_address_pointer: DmaRamPointer,
    pub counter: DmaCounter,
}

// Layout, MSB first:
//   opcode(4) . zero(10) . add(3) . hold(1) . counter mode(1) . direction(1) . zero(1)
//   . ram pointer(3) . data size(8) | counter ram(3) + zero(5)
const DMA_OPCODE: u32 = 0b1100;
const DMA_PAD_LSB: u32 = 18;
const DMA_PAD_WIDTH: u32 = 10;
const DMA_ADD_LSB: u32 = 15;
const DMA_ADD_WIDTH: u32 = 3;
const DMA_HOLD_BIT: u32 = 14;
const DMA_COUNTER_MODE_BIT: u32 = 13;
const DMA_DIRECTION_BIT: u32 = 12;
const DMA_POINTER_LSB: u32 = 8;
const DMA_SIZE_WIDTH: u32 = 8;
const DMA_COUNTER_RAM_LSB: u32 = DMA_SIZE_WIDTH - DmaCounterRam::WIDTH;

impl DmaCommand {
    /// Address-add mode 1; the indexed modes are not supported.
    pub const DEFAULT_ADD_MODE: u8 = 1;

    pub fn counter_mode(&self) -> DmaCounterMode {
        match self.counter {
            DmaCounter::Immediate(_) => DmaCounterMode::Immediate,
            DmaCounter::Referenced(_) => DmaCounterMode::Referenced,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        if self.hold { "DMAH" } else { "DMA" }
    }
}

impl Codec for DmaCommand {
    const WIDTH: u32 = WORD;

    fn decode(bits: u32) -> Result<Self> {
        let opcode = field(bits, 28, 4);
        if opcode != DMA_OPCODE {
            return Err(Error::UnknownOpcode { family: "DMA opcode", bits: opcode });
        }
        if field(bits, DMA_PAD_LSB, DMA_PAD_WIDTH) != 0 {
            return Err(Error::MalformedInput(format!("DMA word {bits:#010x} has non-zero padding")));
        }
        let add = field(bits, DMA_ADD_LSB, DMA_ADD_WIDTH);
        if add != Self::DEFAULT_ADD_MODE as u32 {
            return Err(Error::UnknownOpcode { family: "DMA address-add mode", bits: add });
        }
        let dma_mode = DmaMode::from_bits(field(bits, DMA_DIRECTION_BIT, 1))?;
        let ram_address_pointer = DmaRamPointer::from_bits(field(bits, DMA_POINTER_LSB, DmaRamPointer::WIDTH))?;
        if ram_address_pointer == DmaRamPointer::Prg && dma_mode == DmaMode::RamToD0 {
            return Err(Error::UnknownOpcode { family: "DMA RAM pointer", bits: DmaRamPointer::Prg.bits() });
        }
        let counter = match DmaCounterMode::from_bits(field(bits, DMA_COUNTER_MODE_BIT, 1))? {
            DmaCounterMode::Immediate => DmaCounter::Immediate(field(bits, 0, DMA_SIZE_WIDTH) as u8),
            DmaCounterMode::Referenced => DmaCounter::Referenced(DmaCounterRam::from_bits(field(
                bits,
                DMA_COUNTER_RAM_LSB,
                DmaCounterRam::WIDTH,
            ))?),
        };
        Ok(Self {
            hold: field(bits, DMA_HOLD_BIT, 1) == 1,
            address_add_mode: add as u8,
            dma_mode,
            ram_address_pointer,
            counter,
        })
    }

    fn encode(&self) -> u32 {
        let counter = match self.counter {
            DmaCounter::Immediate(n) => n as u32,
            DmaCounter::Referenced(r) => r.bits() << DMA_COUNTER_RAM_LSB,
        };
        (DMA_OPCODE << 28)
            | ((self.address_add_mode as u32 & mask(DMA_ADD_WIDTH)) << DMA_ADD_LSB)
            | ((self.hold as u32) << DMA_HOLD_BIT)
            | (self.counter_mode().bits() << DMA_COUNTER_MODE_BIT)
            | (self.dma_mode.bits() << DMA_DIRECTION_BIT)
            | (self.ram_address_pointer.bits() << DMA_POINTER_LSB)
            | counter
    }

    fn parse(tokens: &[&str], ctx: &SymbolContext) -> Result<Self> {
        let [mn, from, to, count] = tokens else {
            return Err(wrong_arity(tokens));
        };
        let hold = match *mn {
            "DMA" => false,
            "DMAH" => true,
            other => return Err(Error::malformed(other, "not a DMA command")),
        };
        let (dma_mode, pointer) = match (*from, *to) {
            ("D0", ptr) => (DmaMode::D0ToRam, ptr),
            (ptr, "D0") => (DmaMode::RamToD0, ptr),
            _ => return Err(Error::malformed(*mn, "one endpoint must be D0")),
        };
        let ram_address_pointer = DmaRamPointer::lookup(pointer)
            .ok_or_else(|| Error::malformed(*mn, format!("`{pointer}` is not a DMA RAM pointer")))?;
        if ram_address_pointer == DmaRamPointer::Prg && dma_mode == DmaMode::RamToD0 {
            return Err(Error::malformed(*mn, "program RAM can only be a DMA destination"));
        }
        let counter = match DmaCounterRam::lookup(count) {
            Some(r) => DmaCounter::Referenced(r),
            None => {
                let n = check_range(mn, ctx.constant_value(count)?, 0, mask(DMA_SIZE_WIDTH) as i64)?;
                DmaCounter::Immediate(n as u8)
            }
        };
        Ok(Self { hold, address_add_mode: Self::DEFAULT_ADD_MODE, dma_mode, ram_address_pointer, counter })
    }

    fn render(&self) -> Vec<String> {
        let ptr = self.ram_address_pointer.name();
        let (from, to) = match self.dma_mode {
            DmaMode::D0ToRam => ("D0", ptr),
            DmaMode::RamToD0 => (ptr, "D0"),
        };
        let count = match self.counter {
            DmaCounter::Immediate(n) => n.to_string(),
            DmaCounter::Referenced(r) => r.name().to_string(),
        };
        vec![format!("{} {from},{to},{count}", self.mnemonic())]
    }
}

/// `MVI #imm,dst[,cond]`: load a signed immediate, optionally only when `cond` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MviCommand {
    pub destination: MviDestination,
    pub immediate: i32,
    pub condition: Option<Condition>,
}

const MVI_OPCODE: u32 = 0b10;
const MVI_DEST_LSB: u32 = 26;
const MVI_COND_FLAG_BIT: u32 = 25;
const MVI_COND_LSB: u32 = 19;
const MVI_IMM_WIDTH: u32 = 25;
const MVI_COND_IMM_WIDTH: u32 = 19;

impl MviCommand {
    pub fn immediate_width(&self) -> u32 {
        if self.condition.is_some() { MVI_COND_IMM_WIDTH } else { MVI_IMM_WIDTH }
    }

    /// Render with `target` standing in for the immediate (a label for `PC` loads).
    pub fn render_with_target(&self, target: &str) -> String {
        match self.condition {
            Some(c) => format!("MVI {target},{},{c}", self.destination),
            None => format!("MVI {target},{}", self.destination),
        }
    }
}

impl Codec for MviCommand {
    const WIDTH: u32 = WORD;

    fn decode(bits: u32) -> Result<Self> {
        let opcode = field(bits, 30, 2);
        if opcode != MVI_OPCODE {
            return Err(Error::UnknownOpcode { family: "MVI opcode", bits: opcode });
        }
        let destination = MviDestination::from_bits(field(bits, MVI_DEST_LSB, MviDestination::WIDTH))?;
        let (condition, immediate) = if field(bits, MVI_COND_FLAG_BIT, 1) == 1 {
            let cond = Condition::from_bits(field(bits, MVI_COND_LSB, Condition::WIDTH))?;
            (Some(cond), sign_ext(field(bits, 0, MVI_COND_IMM_WIDTH), MVI_COND_IMM_WIDTH))
        } else {
            (None, sign_ext(field(bits, 0, MVI_IMM_WIDTH), MVI_IMM_WIDTH))
        };
        Ok(Self { destination, immediate, condition })
    }

    fn encode(&self) -> u32 {
        let head = (MVI_OPCODE << 30) | (self.destination.bits() << MVI_DEST_LSB);
        let imm = self.immediate as u32 & mask(self.immediate_width());
        match self.condition {
            Some(c) => head | (1 << MVI_COND_FLAG_BIT) | (c.bits() << MVI_COND_LSB) | imm,
            None => head | imm,
        }
    }

    fn parse(tokens: &[&str], ctx: &SymbolContext) -> Result<Self> {
        let (imm, dst, cond) = match tokens {
            ["MVI", imm, dst] => (*imm, *dst, None),
            ["MVI", imm, dst, cond] => (*imm, *dst, Some(*cond)),
            [mn, ..] if *mn != "MVI" => return Err(Error::malformed(*mn, "not an MVI command")),
            _ => return Err(wrong_arity(tokens)),
        };
        let destination = MviDestination::lookup(dst)
            .ok_or_else(|| Error::malformed("MVI", format!("`{dst}` is not an MVI destination")))?;
        let condition = cond
            .map(|c| Condition::lookup(c).ok_or_else(|| Error::malformed("MVI", format!("`{c}` is not a condition"))))
            .transpose()?;
        let value = if destination == MviDestination::Pc { ctx.label_value(imm)? } else { ctx.constant_value(imm)? };
        let width = if condition.is_some() { MVI_COND_IMM_WIDTH } else { MVI_IMM_WIDTH };
        let half = 1i64 << (width - 1);
        let immediate = check_range("MVI", value, -half, half - 1)? as i32;
        Ok(Self { destination, immediate, condition })
    }

    fn render(&self) -> Vec<String> {
        vec![self.render_with_target(&format!("#{}", self.immediate))]
    }
}

/// `JMP [cond,]target`: jump to a program RAM index.
///
/// The target field is 7 bits wide, so only indices 0..=127 can be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpCommand {
    pub condition: Option<Condition>,
    pub target: u8,
}

// opcode(4) . zero(2) . condition(7) . zero(12) . target(7)
const JMP_OPCODE: u32 = 0b1101;
const JMP_COND_LSB: u32 = 19;
const JMP_TARGET_WIDTH: u32 = 7;

impl JumpCommand {
    pub fn render_with_target(&self, target: &str) -> String {
        match self.condition {
            Some(c) => format!("JMP {c},{target}"),
            None => format!("JMP {target}"),
        }
    }
}

impl Codec for JumpCommand {
    const WIDTH: u32 = WORD;

    fn decode(bits: u32) -> Result<Self> {
        let opcode = field(bits, 28, 4);
        if opcode != JMP_OPCODE {
            return Err(Error::UnknownOpcode { family: "JMP opcode", bits: opcode });
        }
        let high_pad = field(bits, JMP_COND_LSB + Condition::JUMP_WIDTH, 2);
        let low_pad = field(bits, JMP_TARGET_WIDTH, JMP_COND_LSB - JMP_TARGET_WIDTH);
        if high_pad != 0 || low_pad != 0 {
            return Err(Error::MalformedInput(format!("JMP word {bits:#010x} has non-zero padding")));
        }
        let cond = field(bits, JMP_COND_LSB, Condition::JUMP_WIDTH);
        let condition = if cond == 0 { None } else { Some(Condition::from_jump_bits(cond)?) };
        Ok(Self { condition, target: field(bits, 0, JMP_TARGET_WIDTH) as u8 })
    }

    fn encode(&self) -> u32 {
        let cond = self.condition.map_or(0, Condition::jump_bits);
        (JMP_OPCODE << 28) | (cond << JMP_COND_LSB) | self.target as u32
    }

    fn parse(tokens: &[&str], ctx: &SymbolContext) -> Result<Self> {
        let (cond, target) = match tokens {
            ["JMP", target] => (None, *target),
            ["JMP", cond, target] => (Some(*cond), *target),
            [mn, ..] if *mn != "JMP" => return Err(Error::malformed(*mn, "not a JMP command")),
            _ => return Err(wrong_arity(tokens)),
        };
        let condition = cond
            .map(|c| Condition::lookup(c).ok_or_else(|| Error::malformed("JMP", format!("`{c}` is not a condition"))))
            .transpose()?;
        let target = check_range("JMP", ctx.label_value(target)?, 0, mask(JMP_TARGET_WIDTH) as i64)? as u8;
        Ok(Self { condition, target })
    }

    fn render(&self) -> Vec<String> {
        vec![self.render_with_target(&self.target.to_string())]
    }
}
