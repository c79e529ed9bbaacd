use serde::{Deserialize, Serialize};

use crate::model::{Board, Column, Group, TaskLocation};

use super::task_ops::RemovedTask;
use super::{column_ops, group_ops, task_ops};

/// A structural edit to one board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    CreateTask {
        column_id: String,
    },
    UpdateTaskContent {
        task_id: String,
        content: String,
    },
    DeleteTask {
        task_id: String,
    },
    ToggleTaskCompleted {
        task_id: String,
    },
    ConvertTaskToGroup {
        task_id: String,
        content: String,
    },
    ReorderColumnTasks {
        column_id: String,
        from: usize,
        to: usize,
    },
    ReorderGroupTasks {
        group_id: String,
        from: usize,
        to: usize,
    },
    MoveTask {
        task_id: String,
        from: TaskLocation,
        to: TaskLocation,
        to_index: usize,
    },
    CreateGroup {
        column_id: String,
        title: String,
    },
    RenameGroup {
        group_id: String,
        title: String,
    },
    DeleteGroup {
        group_id: String,
    },
    ToggleGroupCompleted {
        group_id: String,
    },
    CreateColumn {
        title: String,
    },
    RenameColumn {
        column_id: String,
        title: String,
    },
    SetColumnColor {
        column_id: String,
        color: Option<String>,
    },
    DeleteColumn {
        column_id: String,
    },
    ReorderColumns {
        from: usize,
        to: usize,
    },
    RenameBoard {
        title: String,
    },
}

/// What applying a command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Unknown ID, declined conversion or out-of-range index
    Unchanged,
    Updated,
    /// A task, group or column was created (group for heading conversion)
    Created { id: String },
    TaskRemoved(RemovedTask),
    ColumnRemoved { column: Column, index: usize },
    GroupRemoved(Group),
}

impl Outcome {
    pub fn changed(&self) -> bool {
        !matches!(self, Outcome::Unchanged)
    }
}

impl From<bool> for Outcome {
    fn from(changed: bool) -> Self {
        if changed {
            Outcome::Updated
        } else {
            Outcome::Unchanged
        }
    }
}

/// Apply a command to a copy of `board`. The input is never modified; when
/// the outcome is `Unchanged` the returned board equals the input.
pub fn apply(board: &Board, command: &Command) -> (Board, Outcome) {
    let mut next = board.clone();
    let outcome = apply_in_place(&mut next, command);
    if outcome.changed() {
        (next, outcome)
    } else {
        (board.clone(), outcome)
    }
}

/// Apply a command directly to a board the caller owns
pub fn apply_in_place(board: &mut Board, command: &Command) -> Outcome {
    match command {
        Command::CreateTask { column_id } => match task_ops::create_task(board, column_id) {
            Some(id) => Outcome::Created { id },
            None => Outcome::Unchanged,
        },
        Command::UpdateTaskContent { task_id, content } => {
            task_ops::update_task_content(board, task_id, content).into()
        }
        Command::DeleteTask { task_id } => match task_ops::delete_task(board, task_id) {
            Some(removed) => Outcome::TaskRemoved(removed),
            None => Outcome::Unchanged,
        },
        Command::ToggleTaskCompleted { task_id } => {
            task_ops::toggle_task_completed(board, task_id).into()
        }
        Command::ConvertTaskToGroup { task_id, content } => {
            match task_ops::convert_task_to_group(board, task_id, content) {
                Some(id) => Outcome::Created { id },
                None => Outcome::Unchanged,
            }
        }
        Command::ReorderColumnTasks {
            column_id,
            from,
            to,
        } => task_ops::reorder_column_tasks(board, column_id, *from, *to).into(),
        Command::ReorderGroupTasks { group_id, from, to } => {
            task_ops::reorder_group_tasks(board, group_id, *from, *to).into()
        }
        Command::MoveTask {
            task_id,
            from,
            to,
            to_index,
        } => task_ops::move_task_across_containers(board, task_id, from, to, *to_index).into(),
        Command::CreateGroup { column_id, title } => {
            match group_ops::create_group(board, column_id, title) {
                Some(id) => Outcome::Created { id },
                None => Outcome::Unchanged,
            }
        }
        Command::RenameGroup { group_id, title } => {
            group_ops::rename_group(board, group_id, title).into()
        }
        Command::DeleteGroup { group_id } => match group_ops::delete_group(board, group_id) {
            Some(group) => Outcome::GroupRemoved(group),
            None => Outcome::Unchanged,
        },
        Command::ToggleGroupCompleted { group_id } => {
            group_ops::toggle_group_completed(board, group_id).into()
        }
        Command::CreateColumn { title } => Outcome::Created {
            id: column_ops::create_column(board, title),
        },
        Command::RenameColumn { column_id, title } => {
            column_ops::rename_column(board, column_id, title).into()
        }
        Command::SetColumnColor { column_id, color } => {
            column_ops::set_column_color(board, column_id, color.as_deref()).into()
        }
        Command::DeleteColumn { column_id } => match column_ops::delete_column(board, column_id) {
            Some((column, index)) => Outcome::ColumnRemoved { column, index },
            None => Outcome::Unchanged,
        },
        Command::ReorderColumns { from, to } => column_ops::reorder_columns(board, *from, *to).into(),
        Command::RenameBoard { title } => {
            board.title = title.clone();
            Outcome::Updated
        }
    }
}
