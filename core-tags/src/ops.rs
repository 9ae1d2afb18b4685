use serde::{Deserialize, Serialize};

/// One metadata edit operation.
///
/// Edits are applied strictly in the order given and are not deduplicated:
/// a later operation on the same key wins through the tag store's own
/// replace-on-insert semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagEdit {
    /// Set `key` to `value`, replacing any existing value.
    Set { key: String, value: String },
    /// Remove every item stored under `key`.
    Delete { key: String },
}

impl TagEdit {
    pub fn key(&self) -> &str {
        match self {
            TagEdit::Set { key, .. } => key,
            TagEdit::Delete { key } => key,
        }
    }
}
