//! SortOrder - Server-side ordering of the call list

use serde::{Deserialize, Serialize};

/// Ordering by creation time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Oldest first
    Ascending,
    /// Newest first
    #[default]
    Descending,
}

impl SortOrder {
    /// Value of the `ascending` query parameter
    pub fn is_ascending(&self) -> bool {
        matches!(self, SortOrder::Ascending)
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "Oldest First",
            SortOrder::Descending => "Newest First",
        }
    }
}
