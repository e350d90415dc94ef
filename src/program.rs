use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ListingConfig;
use crate::context::{SymbolContext, PROGRAM_RAM_WORDS};
use crate::disasm;
use crate::error::{Error, Result};
use crate::instruction::Instruction;
use crate::lexer::{strip_comment, tokenize};

const WORD_BITS: usize = 32;

/// An instruction line waiting for pass 2: 1-based line number and tokens.
type Queued = (usize, Vec<String>);

/// A DSP program: instructions in program RAM order, plus the symbols that
/// were known while building it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    instructions: Vec<Instruction>,
    context: SymbolContext,
}

/// Pass 1: register labels and constants, queue instruction lines.
fn collect_symbols(source: &str) -> Result<(SymbolContext, Vec<Queued>)> {
    let mut ctx = SymbolContext::new();
    let mut queued = Vec::new();
    let mut counter = 0usize;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let mut tokens = tokenize(raw);
        let Some(first) = tokens.first() else {
            continue;
        };
        if first.ends_with(':') {
            ctx.register_label(first, counter).map_err(|e| e.at_line(line_no, &tokens))?;
            tokens.remove(0);
            if tokens.is_empty() {
                continue;
            }
        } else if strip_comment(raw).contains('=') {
            let definition = strip_comment(raw).to_ascii_uppercase();
            ctx.define_constant(&definition).map_err(|e| e.at_line(line_no, &tokens))?;
            continue;
        }
        queued.push((line_no, tokens));
        counter += 1;
    }

    if counter > PROGRAM_RAM_WORDS {
        return Err(Error::ProgramTooLarge { count: counter });
    }
    debug!(
        labels = ctx.labels().len(),
        constants = ctx.constants().len(),
        instructions = counter,
        "symbols collected"
    );
    Ok((ctx, queued))
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Result<Self> {
        if instructions.len() > PROGRAM_RAM_WORDS {
            return Err(Error::ProgramTooLarge { count: instructions.len() });
        }
        Ok(Self { instructions, context: SymbolContext::new() })
    }

    /// Assemble source text. Any failing line aborts the whole program.
    pub fn from_text(source: &str) -> Result<Self> {
        let (context, queued) = collect_symbols(source)?;
        let instructions = queued
            .iter()
            .map(|(line_no, tokens)| {
                Instruction::from_tokens(tokens, &context).map_err(|e| e.at_line(*line_no, tokens))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(count = instructions.len(), "assembled");
        Ok(Self { instructions, context })
    }

    /// Decode an MSB-first bit stream, then name branch targets as
    /// `ListingConfig::default()` asks.
    pub fn from_binary(bits: &BitSlice<u8, Msb0>) -> Result<Self> {
        Self::from_binary_with(bits, &ListingConfig::default())
    }

    pub fn from_binary_with(bits: &BitSlice<u8, Msb0>, cfg: &ListingConfig) -> Result<Self> {
        if bits.len() % WORD_BITS != 0 {
            return Err(Error::MalformedInput(format!(
                "bit length {} is not a multiple of {WORD_BITS}",
                bits.len()
            )));
        }
        let count = bits.len() / WORD_BITS;
        if count > PROGRAM_RAM_WORDS {
            return Err(Error::ProgramTooLarge { count });
        }
        let instructions = bits
            .chunks_exact(WORD_BITS)
            .map(|chunk| Instruction::from_word(chunk.load_be::<u32>()))
            .collect::<Result<Vec<_>>>()?;
        let mut program = Self { instructions, context: SymbolContext::new() };
        if cfg.auto_labels {
            program.label_branch_targets(&cfg.label_prefix)?;
        }
        debug!(count, labels = program.context.labels().len(), "disassembled");
        Ok(program)
    }

    /// Register `<prefix><index:02X>` at every jump or `MVI ...,PC` target
    /// inside the program that has no label yet.
    fn label_branch_targets(&mut self, prefix: &str) -> Result<()> {
        let prefix = prefix.to_ascii_uppercase();
        for instr in &self.instructions {
            let Instruction::Special(cmd) = instr else {
                continue;
            };
            let Some(target) = cmd.branch_target() else {
                continue;
            };
            if target < self.instructions.len() && !self.context.has_label_at(target) {
                self.context.register_label(&format!("{prefix}{target:02X}"), target)?;
            }
        }
        Ok(())
    }

    pub fn to_binary(&self) -> BitVec<u8, Msb0> {
        let mut bits = BitVec::with_capacity(self.instructions.len() * WORD_BITS);
        for instr in &self.instructions {
            bits.extend_from_bitslice(instr.to_bits().as_bitslice());
        }
        bits
    }

    /// Big-endian byte stream, four bytes per instruction.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_binary().into_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with(bytes, &ListingConfig::default())
    }

    pub fn from_bytes_with(bytes: &[u8], cfg: &ListingConfig) -> Result<Self> {
        Self::from_binary_with(bytes.view_bits::<Msb0>(), cfg)
    }

    pub fn words(&self) -> Vec<u32> {
        self.instructions.iter().map(Instruction::to_word).collect()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn context(&self) -> &SymbolContext {
        &self.context
    }

    /// Listing with the default column layout.
    pub fn to_text(&self) -> String {
        self.listing(&ListingConfig::default())
    }

    pub fn listing(&self, cfg: &ListingConfig) -> String {
        disasm::fmt_program(self, cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_one_counts_instructions_not_symbols() {
        let src = "; header\nN = 3\nSTART:\n  MVI #N,MC0\nLOOP: JMP LOOP\n\n  END\n";
        let (ctx, queued) = collect_symbols(src).unwrap();
        assert_eq!(ctx.resolve_label("START"), Ok(0));
        assert_eq!(ctx.resolve_label("LOOP"), Ok(1));
        assert_eq!(ctx.resolve_constant("N"), Ok(3));
        let lines: Vec<usize> = queued.iter().map(|(l, _)| *l).collect();
        assert_eq!(lines, vec![4, 5, 7]);
        assert_eq!(queued[1].1, vec!["JMP", "LOOP"]);
    }

    #[test]
    fn oversized_binary_is_rejected_before_decoding() {
        let bytes = vec![0u8; (PROGRAM_RAM_WORDS + 1) * 4];
        assert_eq!(Program::from_bytes(&bytes), Err(Error::ProgramTooLarge { count: 257 }));
    }
}
