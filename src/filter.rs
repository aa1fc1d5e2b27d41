// Completion-state filter for listing tasks

use crate::error::StoreError;
use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which tasks a listing shows
///
/// Serialized with the names the snapshot format uses: `"all"`,
/// `"Completed"` and `"Pending"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Filter {
    #[default]
    #[serde(rename = "all")]
    All,
    Completed,
    Pending,
}

impl Filter {
    /// Every recognized filter, in display order
    pub const VARIANTS: [Filter; 3] = [Filter::All, Filter::Completed, Filter::Pending];

    /// Name used in the persisted snapshot
    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Completed => "Completed",
            Filter::Pending => "Pending",
        }
    }

    /// Whether a task passes this filter
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => task.done,
            Filter::Pending => !task.done,
        }
    }
}

impl FromStr for Filter {
    type Err = StoreError;

    /// Parses a filter by its exact snapshot name.
    ///
    /// Anything other than `all`, `Completed` or `Pending` is an
    /// `InvalidArgument` naming the rejected value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::VARIANTS
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| StoreError::invalid_argument(format!("Filter {} is not valid", s)))
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
