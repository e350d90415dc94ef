pub mod codec;
pub mod command;
pub mod config;
pub mod context;
pub mod disasm;
pub mod error;
pub mod instruction;
pub mod instructions;
pub mod lexer;
pub mod program;
pub mod tables;

pub mod isa {
    pub mod bus; // ALU, X-bus, Y-bus and D1-bus slot commands
    pub mod special; // whole-word commands: END, LOOP, DMA, MVI, JMP
}

pub use codec::Codec;
pub use command::{Command, SpecialCommand};
pub use config::ListingConfig;
pub use context::{SymbolContext, PROGRAM_RAM_WORDS};
pub use error::{Error, Result};
pub use instruction::{Instruction, Slots};
pub use program::Program;
