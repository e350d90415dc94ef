use crate::error::{Error, Result};

/// Which command family a mnemonic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Bare `NOP`: leaves whichever slot it stands in at its default.
    Nop,
    Alu,
    /// `MOV`: X-bus, Y-bus or D1-bus depending on the operands.
    Mov,
    /// `CLR A` (Y-bus).
    Clr,
    Dma,
    Mvi,
    Jump,
    End,
    Loop,
}

#[derive(Debug, Clone, Copy)]
pub struct MnemonicDesc {
    pub mnemonic: &'static str,
    pub family: Family,
    pub min_operands: usize,
    pub max_operands: usize,
}

const fn desc(mnemonic: &'static str, family: Family, min_operands: usize, max_operands: usize) -> MnemonicDesc {
    MnemonicDesc { mnemonic, family, min_operands, max_operands }
}

pub const TABLE: &[MnemonicDesc] = &[
    desc("NOP", Family::Nop, 0, 0),
    desc("AND", Family::Alu, 0, 0),
    desc("OR", Family::Alu, 0, 0),
    desc("XOR", Family::Alu, 0, 0),
    desc("ADD", Family::Alu, 0, 0),
    desc("SUB", Family::Alu, 0, 0),
    desc("AD2", Family::Alu, 0, 0),
    desc("SR", Family::Alu, 0, 0),
    desc("RR", Family::Alu, 0, 0),
    desc("SL", Family::Alu, 0, 0),
    desc("RL", Family::Alu, 0, 0),
    desc("RL8", Family::Alu, 0, 0),
    desc("MOV", Family::Mov, 2, 2),
    desc("CLR", Family::Clr, 1, 1),
    desc("DMA", Family::Dma, 3, 3),
    desc("DMAH", Family::Dma, 3, 3),
    desc("MVI", Family::Mvi, 2, 3),
    desc("JMP", Family::Jump, 1, 2),
    desc("END", Family::End, 0, 0),
    desc("ENDI", Family::End, 0, 0),
    desc("BTM", Family::Loop, 0, 0),
    desc("LPS", Family::Loop, 0, 0),
];

pub fn lookup(mnemonic: &str) -> Option<&'static MnemonicDesc> {
    TABLE.iter().find(|d| d.mnemonic == mnemonic)
}

/// Split one instruction line into mnemonic groups.
///
/// A mnemonic always takes its minimum operand count; optional operands are
/// taken only while the next token is not itself a mnemonic.
pub fn group(tokens: &[String]) -> Result<Vec<Vec<&str>>> {
    let mut groups = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let d = lookup(&tokens[i]).ok_or_else(|| Error::UnknownMnemonic(tokens[i].clone()))?;
        let mut end = i + 1 + d.min_operands;
        if end > tokens.len() {
            return Err(Error::malformed(
                d.mnemonic,
                format!("expected at least {} operand(s), got {}", d.min_operands, tokens.len() - i - 1),
            ));
        }
        while end < tokens.len() && end - i - 1 < d.max_operands && lookup(&tokens[end]).is_none() {
            end += 1;
        }
        groups.push(tokens[i..end].iter().map(String::as_str).collect());
        i = end;
    }
    Ok(groups)
}
