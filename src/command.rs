use serde::{Deserialize, Serialize};

use crate::codec::Codec;
use crate::context::SymbolContext;
use crate::error::{Error, Result};
use crate::instructions::{self, Family};
use crate::isa::bus::{AluCommand, D1BusCommand, XBusCommand, YBusCommand};
use crate::isa::special::{DmaCommand, EndCommand, JumpCommand, LoopCommand, MviCommand};

/// A command that needs a whole instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialCommand {
    End(EndCommand),
    Loop(LoopCommand),
    Dma(DmaCommand),
    Mvi(MviCommand),
    Jump(JumpCommand),
}

impl SpecialCommand {
    pub fn encode(&self) -> u32 {
        match self {
            SpecialCommand::End(c) => c.encode(),
            SpecialCommand::Loop(c) => c.encode(),
            SpecialCommand::Dma(c) => c.encode(),
            SpecialCommand::Mvi(c) => c.encode(),
            SpecialCommand::Jump(c) => c.encode(),
        }
    }

    pub fn render(&self) -> Vec<String> {
        match self {
            SpecialCommand::End(c) => c.render(),
            SpecialCommand::Loop(c) => c.render(),
            SpecialCommand::Dma(c) => c.render(),
            SpecialCommand::Mvi(c) => c.render(),
            SpecialCommand::Jump(c) => c.render(),
        }
    }

    /// Program RAM index this command transfers control to, if any.
    pub fn branch_target(&self) -> Option<usize> {
        match self {
            SpecialCommand::Jump(j) => Some(j.target as usize),
            SpecialCommand::Mvi(m) if m.destination == crate::tables::MviDestination::Pc => {
                usize::try_from(m.immediate).ok()
            }
            _ => None,
        }
    }
}

/// One parsed mnemonic group, tagged with the slot it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Alu(AluCommand),
    XBus(XBusCommand),
    YBus(YBusCommand),
    D1Bus(D1BusCommand),
    Special(SpecialCommand),
}

impl Command {
    /// Parse one mnemonic group. A bare `NOP` yields `None`: it names no slot.
    pub fn parse(group: &[&str], ctx: &SymbolContext) -> Result<Option<Command>> {
        let Some(first) = group.first() else {
            return Ok(None);
        };
        let desc = instructions::lookup(first).ok_or_else(|| Error::UnknownMnemonic(first.to_string()))?;
        let cmd = match desc.family {
            Family::Nop => return Ok(None),
            Family::Alu => Command::Alu(AluCommand::parse(group, ctx)?),
            Family::Clr => Command::YBus(YBusCommand::parse(group, ctx)?),
            Family::Mov => match group.get(2).copied() {
                Some("X" | "P") => Command::XBus(XBusCommand::parse(group, ctx)?),
                Some("Y" | "A") => Command::YBus(YBusCommand::parse(group, ctx)?),
                _ => Command::D1Bus(D1BusCommand::parse(group, ctx)?),
            },
            Family::Dma => Command::Special(SpecialCommand::Dma(DmaCommand::parse(group, ctx)?)),
            Family::Mvi => Command::Special(SpecialCommand::Mvi(MviCommand::parse(group, ctx)?)),
            Family::Jump => Command::Special(SpecialCommand::Jump(JumpCommand::parse(group, ctx)?)),
            Family::End => Command::Special(SpecialCommand::End(EndCommand::parse(group, ctx)?)),
            Family::Loop => Command::Special(SpecialCommand::Loop(LoopCommand::parse(group, ctx)?)),
        };
        Ok(Some(cmd))
    }

    pub fn render(&self) -> Vec<String> {
        match self {
            Command::Alu(c) => c.render(),
            Command::XBus(c) => c.render(),
            Command::YBus(c) => c.render(),
            Command::D1Bus(c) => c.render(),
            Command::Special(c) => c.render(),
        }
    }

    pub fn slot_name(&self) -> &'static str {
        match self {
            Command::Alu(_) => "ALU",
            Command::XBus(_) => "X-bus",
            Command::YBus(_) => "Y-bus",
            Command::D1Bus(_) => "D1-bus",
            Command::Special(_) => "special",
        }
    }
}
