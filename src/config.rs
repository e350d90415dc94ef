use serde::{Deserialize, Serialize};

/// How decompiled programs are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Column width (in characters, rounded up to a tab stop) for each slot of a compound row.
    pub column_width: usize,
    /// Name jump and `MVI ...,PC` targets when disassembling.
    pub auto_labels: bool,
    pub label_prefix: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            column_width: 16,
            auto_labels: true,
            label_prefix: "L".to_string(),
        }
    }
}
