use serde::{Deserialize, Serialize};

use super::column::Column;
use super::group::Group;
use super::task::Task;

/// Current persisted schema version. Version 1 boards are flat and get
/// migrated on load; version 2 is never downgraded.
pub const DATA_VERSION: u32 = 2;

pub const DEFAULT_BOARD_TITLE: &str = "My Board";
pub const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

/// Where a task lives: directly in a column, or inside one of its groups
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TaskLocation {
    #[serde(rename_all = "camelCase")]
    Direct { column_id: String },
    #[serde(rename_all = "camelCase")]
    Grouped { column_id: String, group_id: String },
}

impl TaskLocation {
    pub fn column_id(&self) -> &str {
        match self {
            TaskLocation::Direct { column_id } | TaskLocation::Grouped { column_id, .. } => {
                column_id
            }
        }
    }

    pub fn group_id(&self) -> Option<&str> {
        match self {
            TaskLocation::Direct { .. } => None,
            TaskLocation::Grouped { group_id, .. } => Some(group_id),
        }
    }
}

/// The top-level aggregate that gets saved, switched and exported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub title: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default = "current_version")]
    pub data_version: u32,
}

fn current_version() -> u32 {
    DATA_VERSION
}

impl Board {
    /// An empty board with no columns
    pub fn new(title: impl Into<String>) -> Self {
        Board {
            title: title.into(),
            columns: Vec::new(),
            data_version: DATA_VERSION,
        }
    }

    /// A board with the given columns, in order
    pub fn with_columns<S: AsRef<str>>(title: impl Into<String>, columns: &[S]) -> Self {
        let mut board = Board::new(title);
        board.columns = columns.iter().map(|c| Column::new(c.as_ref())).collect();
        board
    }

    /// The built-in fallback board
    pub fn default_board() -> Self {
        Board::with_columns(DEFAULT_BOARD_TITLE, &DEFAULT_COLUMNS)
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    /// Find a group anywhere on the board, with the ID of its column
    pub fn group(&self, group_id: &str) -> Option<(&str, &Group)> {
        self.columns.iter().find_map(|c| {
            c.group(group_id).map(|g| (c.id.as_str(), g))
        })
    }

    pub fn group_mut(&mut self, group_id: &str) -> Option<&mut Group> {
        self.columns.iter_mut().find_map(|c| c.group_mut(group_id))
    }

    /// The task list a location refers to
    pub fn container(&self, location: &TaskLocation) -> Option<&Vec<Task>> {
        let column = self.column(location.column_id())?;
        match location.group_id() {
            None => Some(&column.tasks),
            Some(gid) => column.group(gid).map(|g| &g.tasks),
        }
    }

    pub fn container_mut(&mut self, location: &TaskLocation) -> Option<&mut Vec<Task>> {
        let column = self.column_mut(location.column_id())?;
        match location.group_id() {
            None => Some(&mut column.tasks),
            Some(gid) => column.group_mut(gid).map(|g| &mut g.tasks),
        }
    }

    /// Iterate over every task on the board
    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns.iter().flat_map(|c| c.all_tasks())
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.card_count()).sum()
    }

    pub fn completed_count(&self) -> usize {
        self.columns.iter().map(|c| c.completed_count()).sum()
    }
}
