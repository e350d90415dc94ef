use crate::context::SymbolContext;
use crate::error::Result;

/// A command that owns a fixed-width slice of an instruction word.
///
/// `decode` receives the slice right-aligned in a `u32`; `encode` returns it
/// the same way. Special commands own the whole word (`WIDTH == 32`).
pub trait Codec: Sized {
    const WIDTH: u32;

    fn decode(bits: u32) -> Result<Self>;
    fn encode(&self) -> u32;

    /// Parse one mnemonic group: the mnemonic followed by its operands.
    fn parse(tokens: &[&str], ctx: &SymbolContext) -> Result<Self>;

    /// One text line per mnemonic this command stands for.
    fn render(&self) -> Vec<String>;
}

/// Immediate values must fit their field; anything else is a malformed operand.
pub(crate) fn check_range(mnemonic: &str, value: i64, min: i64, max: i64) -> Result<i64> {
    if value < min || value > max {
        return Err(crate::error::Error::malformed(
            mnemonic,
            format!("immediate {value} outside {min}..={max}"),
        ));
    }
    Ok(value)
}

/// Sign-extend the low `bits` bits of `v`.
#[inline]
pub(crate) fn sign_ext(v: u32, bits: u32) -> i32 {
    let s = 32 - bits;
    ((v << s) as i32) >> s
}
