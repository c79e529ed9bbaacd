use serde::{Deserialize, Serialize};

use super::id::new_id;
use super::task::Task;

/// A named, ordered sub-list of tasks inside one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl Group {
    pub fn new(title: impl Into<String>) -> Self {
        Group {
            id: new_id(),
            title: title.into(),
            tasks: Vec::new(),
            completed: None,
        }
    }

    /// True when every member task is completed (vacuously true when empty)
    pub fn all_completed(&self) -> bool {
        self.tasks.iter().all(|t| t.completed)
    }
}
