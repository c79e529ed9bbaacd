use serde::{Deserialize, Serialize};

use super::group::Group;
use super::id::new_id;
use super::task::Task;

/// A workflow stage: ungrouped tasks followed by groups, both ordered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub title: String,
    /// Tasks that live directly in the column (not in any group)
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Column {
    pub fn new(title: impl Into<String>) -> Self {
        Column {
            id: new_id(),
            title: title.into(),
            tasks: Vec::new(),
            groups: Vec::new(),
            color: None,
        }
    }

    /// Direct tasks plus every group's tasks
    pub fn card_count(&self) -> usize {
        self.tasks.len() + self.groups.iter().map(|g| g.tasks.len()).sum::<usize>()
    }

    /// Number of completed cards, direct and grouped
    pub fn completed_count(&self) -> usize {
        self.all_tasks().filter(|t| t.completed).count()
    }

    /// Iterate over direct tasks, then grouped tasks in group order
    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.tasks.iter()))
    }

    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn group_mut(&mut self, group_id: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == group_id)
    }
}
