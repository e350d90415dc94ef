use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::codec::Codec;
use crate::command::{Command, SpecialCommand};
use crate::context::SymbolContext;
use crate::error::{Error, Result};
use crate::instructions;
use crate::isa::bus::{AluCommand, D1BusCommand, XBusCommand, YBusCommand};
use crate::isa::special::{DmaCommand, EndCommand, JumpCommand, LoopCommand, MviCommand};
use crate::tables::field;

/// The four commands a compound word executes in one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slots {
    pub alu: AluCommand,
    pub xbus: XBusCommand,
    pub ybus: YBusCommand,
    pub d1bus: D1BusCommand,
}

// Compound layout, MSB first: 00 . ALU(4) . X(6) . Y(6) . D1(14)
const D1_LSB: u32 = 0;
const Y_LSB: u32 = D1_LSB + D1BusCommand::WIDTH;
const X_LSB: u32 = Y_LSB + YBusCommand::WIDTH;
const ALU_LSB: u32 = X_LSB + XBusCommand::WIDTH;
const COMPOUND_WIDTH: u32 = ALU_LSB + AluCommand::WIDTH;

impl Slots {
    pub fn decode(word: u32) -> Result<Self> {
        Ok(Self {
            alu: AluCommand::decode(field(word, ALU_LSB, AluCommand::WIDTH))?,
            xbus: XBusCommand::decode(field(word, X_LSB, XBusCommand::WIDTH))?,
            ybus: YBusCommand::decode(field(word, Y_LSB, YBusCommand::WIDTH))?,
            d1bus: D1BusCommand::decode(field(word, D1_LSB, D1BusCommand::WIDTH))?,
        })
    }

    pub fn encode(&self) -> u32 {
        (self.alu.encode() << ALU_LSB)
            | (self.xbus.encode() << X_LSB)
            | (self.ybus.encode() << Y_LSB)
            | (self.d1bus.encode() << D1_LSB)
    }

    /// Rendered text of each slot, in ALU, X, Y, D1 order. A merged X or Y
    /// slot contributes two entries.
    pub fn render(&self) -> Vec<String> {
        let mut out = self.alu.render();
        out.extend(self.xbus.render());
        out.extend(self.ybus.render());
        out.extend(self.d1bus.render());
        out
    }
}

/// One 32-bit DSP instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    Compound(Slots),
    Special(SpecialCommand),
}

impl Default for Instruction {
    fn default() -> Self {
        Instruction::Compound(Slots::default())
    }
}

fn collision(slot: &'static str, first: Vec<String>, second: Vec<String>) -> Error {
    Error::IncompatibleCommands { slot, first: first.join(" / "), second: second.join(" / ") }
}

impl Instruction {
    /// Build an instruction from one tokenized source line.
    pub fn from_tokens(tokens: &[String], ctx: &SymbolContext) -> Result<Self> {
        let mut commands = Vec::new();
        for group in instructions::group(tokens)? {
            if let Some(cmd) = Command::parse(&group, ctx)? {
                commands.push(cmd);
            }
        }
        Self::from_commands(commands)
    }

    /// Assign parsed commands to their slots, merging X/Y pairs that share a cycle.
    pub fn from_commands(commands: Vec<Command>) -> Result<Self> {
        let mut alu: Option<AluCommand> = None;
        let mut xbus: Option<XBusCommand> = None;
        let mut ybus: Option<YBusCommand> = None;
        let mut d1bus: Option<D1BusCommand> = None;
        let mut special: Option<SpecialCommand> = None;
        let mut first_bus: Option<Command> = None;

        for cmd in commands {
            if let Some(s) = special {
                return Err(collision("special", s.render(), cmd.render()));
            }
            match cmd {
                Command::Special(s) => {
                    if let Some(prev) = first_bus {
                        return Err(collision(cmd.slot_name(), prev.render(), s.render()));
                    }
                    special = Some(s);
                    continue;
                }
                Command::Alu(c) => match alu {
                    None => alu = Some(c),
                    Some(prev) => return Err(collision(cmd.slot_name(), prev.render(), c.render())),
                },
                Command::XBus(c) => match xbus {
                    None => xbus = Some(c),
                    Some(prev) => {
                        xbus = Some(prev.merge(c).ok_or_else(|| collision(cmd.slot_name(), prev.render(), c.render()))?)
                    }
                },
                Command::YBus(c) => match ybus {
                    None => ybus = Some(c),
                    Some(prev) => {
                        ybus = Some(prev.merge(c).ok_or_else(|| collision(cmd.slot_name(), prev.render(), c.render()))?)
                    }
                },
                Command::D1Bus(c) => match d1bus {
                    None => d1bus = Some(c),
                    Some(prev) => return Err(collision(cmd.slot_name(), prev.render(), c.render())),
                },
            }
            first_bus.get_or_insert(cmd);
        }

        if let Some(s) = special {
            return Ok(Instruction::Special(s));
        }
        Ok(Instruction::Compound(Slots {
            alu: alu.unwrap_or_default(),
            xbus: xbus.unwrap_or_default(),
            ybus: ybus.unwrap_or_default(),
            d1bus: d1bus.unwrap_or_default(),
        }))
    }

    /// Decode one word, picking the format from its leading bits.
    pub fn from_word(word: u32) -> Result<Self> {
        let top2 = field(word, 30, 2);
        let top4 = field(word, 28, 4);
        let top5 = field(word, 27, 5);
        let instr = if top2 == 0b00 {
            Instruction::Compound(Slots::decode(word)?)
        } else if top5 == 0b11110 || top5 == 0b11111 {
            Instruction::Special(SpecialCommand::End(EndCommand::decode(word)?))
        } else if top5 == 0b11100 || top5 == 0b11101 {
            Instruction::Special(SpecialCommand::Loop(LoopCommand::decode(word)?))
        } else if top4 == 0b1100 {
            Instruction::Special(SpecialCommand::Dma(DmaCommand::decode(word)?))
        } else if top2 == 0b10 {
            Instruction::Special(SpecialCommand::Mvi(MviCommand::decode(word)?))
        } else if top4 == 0b1101 {
            Instruction::Special(SpecialCommand::Jump(JumpCommand::decode(word)?))
        } else {
            return Err(Error::UnknownInstructionFormat { word });
        };
        trace!(word, ?instr, "decoded");
        Ok(instr)
    }

    pub fn to_word(&self) -> u32 {
        match self {
            Instruction::Compound(slots) => slots.encode(),
            Instruction::Special(cmd) => cmd.encode(),
        }
    }

    /// The word as a 32-bit, MSB-first bit string.
    pub fn to_bits(&self) -> BitVec<u8, Msb0> {
        BitVec::from_slice(&self.to_word().to_be_bytes())
    }

    pub fn from_bits(bits: &BitSlice<u8, Msb0>) -> Result<Self> {
        if bits.len() != 32 {
            return Err(Error::MalformedInput(format!("an instruction is 32 bits, got {}", bits.len())));
        }
        Self::from_word(bits.load_be::<u32>())
    }

    /// Text lines in fixed column order: ALU, X-bus, Y-bus, D1-bus.
    pub fn to_text(&self) -> Vec<String> {
        match self {
            Instruction::Compound(slots) => slots.render(),
            Instruction::Special(cmd) => cmd.render(),
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Instruction::Special(_))
    }
}

const _: () = assert!(COMPOUND_WIDTH == 30);
