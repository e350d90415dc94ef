/// Every failure the assembler and disassembler can report.
///
/// All of them are deterministic: the same input fails the same way, and a
/// failure aborts the whole pass.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),
    #[error("unknown {family} bit pattern {bits:#b}")]
    UnknownOpcode { family: &'static str, bits: u32 },
    #[error("malformed `{mnemonic}`: {reason}")]
    MalformedMnemonic { mnemonic: String, reason: String },
    #[error("incompatible commands for {slot}: `{first}` and `{second}`")]
    IncompatibleCommands {
        slot: &'static str,
        first: String,
        second: String,
    },
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),
    #[error("symbol `{0}` is already defined")]
    DuplicateSymbol(String),
    #[error("label `{name}` points at instruction {index}, program RAM holds 256")]
    SymbolOutOfRange { name: String, index: usize },
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("unknown instruction format {word:#010x}")]
    UnknownInstructionFormat { word: u32 },
    #[error("program has {count} instructions, program RAM holds 256")]
    ProgramTooLarge { count: usize },
    #[error("line {line}: `{tokens}`: {source}")]
    Line {
        line: usize,
        tokens: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn malformed(mnemonic: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedMnemonic { mnemonic: mnemonic.into(), reason: reason.into() }
    }

    pub(crate) fn at_line(self, line: usize, tokens: &[String]) -> Self {
        Error::Line { line, tokens: tokens.join(" "), source: Box::new(self) }
    }

    /// The underlying error kind, with any line annotation peeled off.
    pub fn kind(&self) -> &Error {
        match self {
            Error::Line { source, .. } => source.kind(),
            other => other,
        }
    }

    /// 1-based source line the error was raised on, if assembly attached one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Line { line, .. } => Some(*line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
