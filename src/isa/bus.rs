//! Commands that share a compound instruction word: ALU, X-bus, Y-bus, D1-bus.

use serde::{Deserialize, Serialize};

use crate::codec::{check_range, Codec};
use crate::context::SymbolContext;
use crate::error::{Error, Result};
use crate::tables::{field, AluOpcode, D1Destination, D1Opcode, D1Source, XOpcode, XySource, YOpcode};

fn expect_arity(tokens: &[&str], n: usize) -> Result<()> {
    if tokens.len() != n + 1 {
        let mn = tokens.first().copied().unwrap_or_default();
        return Err(Error::malformed(mn, format!("expected {n} operand(s), got {}", tokens.len().saturating_sub(1))));
    }
    Ok(())
}

fn xy_source(mnemonic: &str, token: &str) -> Result<XySource> {
    XySource::lookup(token).ok_or_else(|| Error::malformed(mnemonic, format!("`{token}` is not an X/Y-bus source")))
}

/// Operands that name DSP registers and can never be a symbol.
fn is_register_name(token: &str) -> bool {
    matches!(token, "A" | "P" | "X" | "Y" | "ALU" | "MUL" | "PC")
        || XySource::lookup(token).is_some()
        || D1Destination::lookup(token).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AluCommand {
    pub opcode: AluOpcode,
}

impl AluCommand {
    pub const NOP: AluCommand = AluCommand { opcode: AluOpcode::Nop };
}

impl Default for AluCommand {
    fn default() -> Self {
        Self::NOP
    }
}

impl Codec for AluCommand {
    const WIDTH: u32 = AluOpcode::WIDTH;

    fn decode(bits: u32) -> Result<Self> {
        Ok(Self { opcode: AluOpcode::from_bits(bits)? })
    }

    fn encode(&self) -> u32 {
        self.opcode.bits()
    }

    fn parse(tokens: &[&str], _ctx: &SymbolContext) -> Result<Self> {
        expect_arity(tokens, 0)?;
        let opcode = AluOpcode::lookup(tokens[0])
            .ok_or_else(|| Error::malformed(tokens[0], "not an ALU command"))?;
        Ok(Self { opcode })
    }

    fn render(&self) -> Vec<String> {
        vec![self.opcode.name().to_string()]
    }
}

/// X-bus control: feeds the multiplier (X) or the P register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum XBusCommand {
    #[default]
    Nop,
    /// `MOV MUL,P`
    MovMulP,
    /// `MOV src,P`
    MovSrcP(XySource),
    /// `MOV src,X`
    MovSrcX(XySource),
    /// `MOV src,X` and `MOV MUL,P` in one cycle. Only produced by [`XBusCommand::merge`] or decode.
    MovSrcXMulP(XySource),
}

impl XBusCommand {
    pub fn opcode(&self) -> XOpcode {
        match self {
            XBusCommand::Nop => XOpcode::Nop,
            XBusCommand::MovMulP => XOpcode::MovMulP,
            XBusCommand::MovSrcP(_) => XOpcode::MovSrcP,
            XBusCommand::MovSrcX(_) => XOpcode::MovSrcX,
            XBusCommand::MovSrcXMulP(_) => XOpcode::MovSrcXMulP,
        }
    }

    pub fn source(&self) -> Option<XySource> {
        match self {
            XBusCommand::MovSrcP(s) | XBusCommand::MovSrcX(s) | XBusCommand::MovSrcXMulP(s) => Some(*s),
            XBusCommand::Nop | XBusCommand::MovMulP => None,
        }
    }

    /// Combine two X-bus commands written on the same line. Only
    /// `MOV src,X` + `MOV MUL,P` (either order) fit in one slot.
    pub fn merge(self, other: XBusCommand) -> Option<XBusCommand> {
        match (self, other) {
            (XBusCommand::MovSrcX(s), XBusCommand::MovMulP) | (XBusCommand::MovMulP, XBusCommand::MovSrcX(s)) => {
                Some(XBusCommand::MovSrcXMulP(s))
            }
            _ => None,
        }
    }
}

impl Codec for XBusCommand {
    const WIDTH: u32 = XOpcode::WIDTH + XySource::WIDTH;

    fn decode(bits: u32) -> Result<Self> {
        let opcode = XOpcode::from_bits(field(bits, XySource::WIDTH, XOpcode::WIDTH))?;
        let src = || XySource::from_bits(field(bits, 0, XySource::WIDTH));
        Ok(match opcode {
            XOpcode::Nop => XBusCommand::Nop,
            XOpcode::MovMulP => XBusCommand::MovMulP,
            XOpcode::MovSrcP => XBusCommand::MovSrcP(src()?),
            XOpcode::MovSrcX => XBusCommand::MovSrcX(src()?),
            XOpcode::MovSrcXMulP => XBusCommand::MovSrcXMulP(src()?),
        })
    }

    fn encode(&self) -> u32 {
        let src = self.source().map_or(0, XySource::bits);
        (self.opcode().bits() << XySource::WIDTH) | src
    }

    fn parse(tokens: &[&str], _ctx: &SymbolContext) -> Result<Self> {
        match tokens {
            ["NOP"] => Ok(XBusCommand::Nop),
            ["MOV", "MUL", "P"] => Ok(XBusCommand::MovMulP),
            ["MOV", src, "P"] => Ok(XBusCommand::MovSrcP(xy_source("MOV", src)?)),
            ["MOV", src, "X"] => Ok(XBusCommand::MovSrcX(xy_source("MOV", src)?)),
            [mn, ..] => Err(Error::malformed(*mn, format!("`{}` is not an X-bus command", tokens.join(" ")))),
            [] => Err(Error::malformed("", "empty X-bus command")),
        }
    }

    fn render(&self) -> Vec<String> {
        match self {
            XBusCommand::Nop => vec!["NOP".to_string()],
            XBusCommand::MovMulP => vec!["MOV MUL,P".to_string()],
            XBusCommand::MovSrcP(s) => vec![format!("MOV {s},P")],
            XBusCommand::MovSrcX(s) => vec![format!("MOV {s},X")],
            XBusCommand::MovSrcXMulP(s) => vec![format!("MOV {s},X"), "MOV MUL,P".to_string()],
        }
    }
}

/// Y-bus control: feeds the Y register or the accumulator (A).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum YBusCommand {
    #[default]
    Nop,
    /// `CLR A`
    ClrA,
    /// `MOV ALU,A`
    MovAluA,
    /// `MOV src,A`
    MovSrcA(XySource),
    /// `MOV src,Y`
    MovSrcY(XySource),
    /// `MOV src,Y` and `MOV ALU,A` in one cycle. Only produced by [`YBusCommand::merge`] or decode.
    MovSrcYAluA(XySource),
}

impl YBusCommand {
    pub fn opcode(&self) -> YOpcode {
        match self {
            YBusCommand::Nop => YOpcode::Nop,
            YBusCommand::ClrA => YOpcode::ClrA,
            YBusCommand::MovAluA => YOpcode::MovAluA,
            YBusCommand::MovSrcA(_) => YOpcode::MovSrcA,
            YBusCommand::MovSrcY(_) => YOpcode::MovSrcY,
            YBusCommand::MovSrcYAluA(_) => YOpcode::MovSrcYAluA,
        }
    }

    pub fn source(&self) -> Option<XySource> {
        match self {
            YBusCommand::MovSrcA(s) | YBusCommand::MovSrcY(s) | YBusCommand::MovSrcYAluA(s) => Some(*s),
            YBusCommand::Nop | YBusCommand::ClrA | YBusCommand::MovAluA => None,
        }
    }

    /// Only `MOV src,Y` + `MOV ALU,A` (either order) fit in one slot.
    pub fn merge(self, other: YBusCommand) -> Option<YBusCommand> {
        match (self, other) {
            (YBusCommand::MovSrcY(s), YBusCommand::MovAluA) | (YBusCommand::MovAluA, YBusCommand::MovSrcY(s)) => {
                Some(YBusCommand::MovSrcYAluA(s))
            }
            _ => None,
        }
    }
}

impl Codec for YBusCommand {
    const WIDTH: u32 = YOpcode::WIDTH + XySource::WIDTH;

    fn decode(bits: u32) -> Result<Self> {
        let opcode = YOpcode::from_bits(field(bits, XySource::WIDTH, YOpcode::WIDTH))?;
        let src = || XySource::from_bits(field(bits, 0, XySource::WIDTH));
        Ok(match opcode {
            YOpcode::Nop => YBusCommand::Nop,
            YOpcode::ClrA => YBusCommand::ClrA,
            YOpcode::MovAluA => YBusCommand::MovAluA,
            YOpcode::MovSrcA => YBusCommand::MovSrcA(src()?),
            YOpcode::MovSrcY => YBusCommand::MovSrcY(src()?),
            YOpcode::MovSrcYAluA => YBusCommand::MovSrcYAluA(src()?),
        })
    }

    fn encode(&self) -> u32 {
        let src = self.source().map_or(0, XySource::bits);
        (self.opcode().bits() << XySource::WIDTH) | src
    }

    fn parse(tokens: &[&str], _ctx: &SymbolContext) -> Result<Self> {
        match tokens {
            ["NOP"] => Ok(YBusCommand::Nop),
            ["CLR", "A"] => Ok(YBusCommand::ClrA),
            ["MOV", "ALU", "A"] => Ok(YBusCommand::MovAluA),
            ["MOV", src, "A"] => Ok(YBusCommand::MovSrcA(xy_source("MOV", src)?)),
            ["MOV", src, "Y"] => Ok(YBusCommand::MovSrcY(xy_source("MOV", src)?)),
            [mn, ..] => Err(Error::malformed(*mn, format!("`{}` is not a Y-bus command", tokens.join(" ")))),
            [] => Err(Error::malformed("", "empty Y-bus command")),
        }
    }

    fn render(&self) -> Vec<String> {
        match self {
            YBusCommand::Nop => vec!["NOP".to_string()],
            YBusCommand::ClrA => vec!["CLR A".to_string()],
            YBusCommand::MovAluA => vec!["MOV ALU,A".to_string()],
            YBusCommand::MovSrcA(s) => vec![format!("MOV {s},A")],
            YBusCommand::MovSrcY(s) => vec![format!("MOV {s},Y")],
            YBusCommand::MovSrcYAluA(s) => vec![format!("MOV {s},Y"), "MOV ALU,A".to_string()],
        }
    }
}

/// D1-bus control: moves a source register or an 8-bit immediate to a destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum D1BusCommand {
    #[default]
    Nop,
    /// `MOV #imm,dst`
    MovImm { immediate: u8, destination: D1Destination },
    /// `MOV src,dst`
    MovSrc { source: D1Source, destination: D1Destination },
}

const D1_IMM_WIDTH: u32 = 8;

impl D1BusCommand {
    pub fn opcode(&self) -> D1Opcode {
        match self {
            D1BusCommand::Nop => D1Opcode::Nop,
            D1BusCommand::MovImm { .. } => D1Opcode::MovImmDst,
            D1BusCommand::MovSrc { .. } => D1Opcode::MovSrcDst,
        }
    }
}

impl Codec for D1BusCommand {
    // opcode(2) . destination(4) . immediate(8) | 0000 . source(4)
    const WIDTH: u32 = D1Opcode::WIDTH + D1Destination::WIDTH + D1_IMM_WIDTH;

    fn decode(bits: u32) -> Result<Self> {
        let opcode = D1Opcode::from_bits(field(bits, D1Destination::WIDTH + D1_IMM_WIDTH, D1Opcode::WIDTH))?;
        let destination = || D1Destination::from_bits(field(bits, D1_IMM_WIDTH, D1Destination::WIDTH));
        Ok(match opcode {
            D1Opcode::Nop => D1BusCommand::Nop,
            D1Opcode::MovImmDst => D1BusCommand::MovImm {
                immediate: field(bits, 0, D1_IMM_WIDTH) as u8,
                destination: destination()?,
            },
            D1Opcode::MovSrcDst => D1BusCommand::MovSrc {
                source: D1Source::from_bits(field(bits, 0, D1Source::WIDTH))?,
                destination: destination()?,
            },
        })
    }

    fn encode(&self) -> u32 {
        let op = self.opcode().bits() << (D1Destination::WIDTH + D1_IMM_WIDTH);
        match self {
            D1BusCommand::Nop => op,
            D1BusCommand::MovImm { immediate, destination } => {
                op | (destination.bits() << D1_IMM_WIDTH) | *immediate as u32
            }
            D1BusCommand::MovSrc { source, destination } => {
                op | (destination.bits() << D1_IMM_WIDTH) | source.bits()
            }
        }
    }

    fn parse(tokens: &[&str], ctx: &SymbolContext) -> Result<Self> {
        match tokens {
            ["NOP"] => Ok(D1BusCommand::Nop),
            ["MOV", src, dst] => {
                let destination = D1Destination::lookup(dst)
                    .ok_or_else(|| Error::malformed("MOV", format!("`{dst}` is not a D1-bus destination")))?;
                if let Some(source) = D1Source::lookup(src) {
                    return Ok(D1BusCommand::MovSrc { source, destination });
                }
                if is_register_name(src) {
                    return Err(Error::malformed("MOV", format!("`{src}` is not a D1-bus source")));
                }
                let value = ctx.constant_value(src)?;
                let immediate = check_range("MOV", value, 0, 0xFF)? as u8;
                Ok(D1BusCommand::MovImm { immediate, destination })
            }
            [mn, ..] => Err(Error::malformed(*mn, format!("`{}` is not a D1-bus command", tokens.join(" ")))),
            [] => Err(Error::malformed("", "empty D1-bus command")),
        }
    }

    fn render(&self) -> Vec<String> {
        match self {
            D1BusCommand::Nop => vec!["NOP".to_string()],
            D1BusCommand::MovImm { immediate, destination } => vec![format!("MOV #{immediate},{destination}")],
            D1BusCommand::MovSrc { source, destination } => vec![format!("MOV {source},{destination}")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_fill_thirty_bits() {
        assert_eq!(AluCommand::WIDTH + XBusCommand::WIDTH + YBusCommand::WIDTH + D1BusCommand::WIDTH, 30);
        assert_eq!(D1BusCommand::WIDTH, 14);
    }

    #[test]
    fn register_names_are_not_symbols() {
        assert!(is_register_name("RX"));
        assert!(is_register_name("MC3"));
        assert!(!is_register_name("SIZE"));
    }

    #[test]
    fn expect_arity_reports_counts() {
        let err = expect_arity(&["AND", "X"], 0).unwrap_err();
        assert!(err.to_string().contains("expected 0 operand(s), got 1"));
    }
}
