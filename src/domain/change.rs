//! Change records produced by snapshot diffing

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of one key's change between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    Added,
    Removed,
    FlagChanged,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "Added",
            ChangeType::Removed => "Removed",
            ChangeType::FlagChanged => "FlagChanged",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified difference between the previous and current snapshot
///
/// `prev_flag` is empty for [`ChangeType::Added`], `curr_flag` is empty for
/// [`ChangeType::Removed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub change_type: ChangeType,
    pub doc_family: String,
    pub doc_id: String,
    pub code_system: String,
    pub code: String,
    pub prev_flag: String,
    pub curr_flag: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_type_serializes_as_label() {
        let json = serde_json::to_string(&ChangeType::FlagChanged).unwrap();
        assert_eq!(json, "\"FlagChanged\"");
        assert_eq!(ChangeType::Added.to_string(), "Added");
    }
}
