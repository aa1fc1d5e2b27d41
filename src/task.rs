// Task entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One unit of work on the list
///
/// Serialized with camelCase keys (`createdAt`) to match the snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a pending task with a fresh id, stamped with the current time.
    ///
    /// The description is taken as-is; the store validates it.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            description: description.into(),
            done: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Flip the done flag
    pub fn toggle(&mut self) {
        self.done = !self.done;
    }
}
