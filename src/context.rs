use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::lexer::parse_number;

/// Program RAM holds 256 instruction words.
pub const PROGRAM_RAM_WORDS: usize = 256;

/// Labels and constants known to one assembly or disassembly pass.
///
/// Filled during pass 1, read during pass 2. Each `Program` builds its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolContext {
    labels: HashMap<String, usize>,
    constants: HashMap<String, i64>,
}

fn label_key(name: &str) -> &str {
    let name = name.trim();
    name.strip_suffix(':').unwrap_or(name).trim()
}

impl SymbolContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_label(&mut self, name: &str, index: usize) -> Result<()> {
        let key = label_key(name);
        if index >= PROGRAM_RAM_WORDS {
            return Err(Error::SymbolOutOfRange { name: key.to_string(), index });
        }
        if self.labels.contains_key(key) {
            return Err(Error::DuplicateSymbol(key.to_string()));
        }
        trace!(label = key, index, "label registered");
        self.labels.insert(key.to_string(), index);
        Ok(())
    }

    pub fn register_constant(&mut self, name: &str, value: i64) -> Result<()> {
        let key = name.trim();
        if key.is_empty() {
            return Err(Error::malformed("=", "constant without a name"));
        }
        if self.constants.contains_key(key) {
            return Err(Error::DuplicateSymbol(key.to_string()));
        }
        trace!(constant = key, value, "constant registered");
        self.constants.insert(key.to_string(), value);
        Ok(())
    }

    /// Register a `NAME=value` definition line.
    pub fn define_constant(&mut self, line: &str) -> Result<()> {
        let mut parts = line.split('=');
        let (Some(name), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::malformed(line.trim(), "a constant needs exactly one `=`"));
        };
        let value = parse_number(value)
            .ok_or_else(|| Error::malformed(line.trim(), format!("`{}` is not a number", value.trim())))?;
        self.register_constant(name, value)
    }

    pub fn resolve_label(&self, name: &str) -> Result<usize> {
        let key = label_key(name);
        self.labels.get(key).copied().ok_or_else(|| Error::UnknownSymbol(key.to_string()))
    }

    pub fn resolve_constant(&self, name: &str) -> Result<i64> {
        let key = name.trim();
        self.constants.get(key).copied().ok_or_else(|| Error::UnknownSymbol(key.to_string()))
    }

    /// A numeric literal, `#literal`, or the index of a registered label.
    pub fn label_value(&self, token: &str) -> Result<i64> {
        match parse_number(token) {
            Some(v) => Ok(v),
            None => self.resolve_label(token.trim_start_matches('#')).map(|i| i as i64),
        }
    }

    /// A numeric literal, `#literal`, or the value of a registered constant.
    pub fn constant_value(&self, token: &str) -> Result<i64> {
        match parse_number(token) {
            Some(v) => Ok(v),
            None => self.resolve_constant(token.trim_start_matches('#')),
        }
    }

    /// Label names pointing at `index`, sorted.
    pub fn labels_at(&self, index: usize) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .labels
            .iter()
            .filter(|&(_, &i)| i == index)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn has_label_at(&self, index: usize) -> bool {
        self.labels.values().any(|&i| i == index)
    }

    pub fn labels(&self) -> &HashMap<String, usize> {
        &self.labels
    }

    pub fn constants(&self) -> &HashMap<String, i64> {
        &self.constants
    }
}
