use std::path::{Path, PathBuf};

/// Problems with an input file itself, before any assembling or decoding.
#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("cannot read {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Binary input whose byte length is not a whole number of words.
    #[error("{}: {len} bytes is not a multiple of 4", .path.display())]
    UnalignedLength { path: PathBuf, len: usize },
}

impl InputError {
    pub fn exit_code(&self) -> u8 {
        match self {
            InputError::Unreadable { .. } => 2,
            InputError::UnalignedLength { .. } => 3,
        }
    }
}

pub fn load_source(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|source| InputError::Unreadable { path: path.to_path_buf(), source })
}

/// Read a program image: big-endian 32-bit words, nothing else.
pub fn load_image(path: &Path) -> Result<Vec<u8>, InputError> {
    let bytes = std::fs::read(path).map_err(|source| InputError::Unreadable { path: path.to_path_buf(), source })?;
    if bytes.len() % 4 != 0 {
        return Err(InputError::UnalignedLength { path: path.to_path_buf(), len: bytes.len() });
    }
    Ok(bytes)
}

/// One `0x%08x` line per word.
pub fn hex_dump(words: &[u32]) -> String {
    words.iter().map(|w| format!("{w:#010x}\n")).collect()
}
