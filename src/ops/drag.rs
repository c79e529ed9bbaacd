use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{Board, TaskLocation};

use super::command::{self, Command, Outcome};
use super::task_ops::{locate_task, task_index};

/// What is being dragged, or what it is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DragKind {
    Task,
    Column,
    Group,
    /// The empty drop area of a column; its ID is the column's ID
    ColumnArea,
}

impl fmt::Display for DragKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DragKind::Task => write!(f, "task"),
            DragKind::Column => write!(f, "column"),
            DragKind::Group => write!(f, "group"),
            DragKind::ColumnArea => write!(f, "column-area"),
        }
    }
}

impl FromStr for DragKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "task" => Ok(DragKind::Task),
            "column" => Ok(DragKind::Column),
            "group" => Ok(DragKind::Group),
            "column-area" | "columnarea" | "area" => Ok(DragKind::ColumnArea),
            other => Err(format!(
                "invalid drag kind '{}' (expected task, column, group or column-area)",
                other
            )),
        }
    }
}

/// The final (active, over) pair of a drag gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    pub active_id: String,
    pub active_kind: DragKind,
    /// `None` when dropped outside any target
    pub over: Option<(String, DragKind)>,
}

impl DragEnd {
    pub fn new(active_id: &str, active_kind: DragKind, over_id: &str, over_kind: DragKind) -> Self {
        DragEnd {
            active_id: active_id.to_string(),
            active_kind,
            over: Some((over_id.to_string(), over_kind)),
        }
    }
}

/// Decide which single mutation a drop performs.
///
/// Rules, first match wins:
/// 1. dragging a column reorders columns, only while `column_move_mode` is on;
/// 2. a task over a group goes to the end of that group;
/// 3. a task over a task takes the over-task's index (reorder when both share
///    a list, move otherwise);
/// 4. a task over a column (or its drop area) goes to the end of the
///    column's direct list.
///
/// Dropping on itself, outside any target, or on an unknown ID resolves to
/// nothing.
pub fn resolve(board: &Board, drag: &DragEnd, column_move_mode: bool) -> Option<Command> {
    let (over_id, over_kind) = drag.over.as_ref()?;
    let over_id = over_id.as_str();
    if drag.active_id == over_id {
        return None;
    }

    match (drag.active_kind, *over_kind) {
        (DragKind::Column, over_kind) => {
            if !column_move_mode {
                return None;
            }
            if !matches!(over_kind, DragKind::Column | DragKind::ColumnArea) {
                return None;
            }
            let from = board.column_index(&drag.active_id)?;
            let to = board.column_index(over_id)?;
            Some(Command::ReorderColumns { from, to })
        }
        (DragKind::Task, DragKind::Group) => {
            let from = locate_task(board, &drag.active_id)?;
            let (column_id, group) = board.group(over_id)?;
            let to = TaskLocation::Grouped {
                column_id: column_id.to_string(),
                group_id: group.id.clone(),
            };
            Some(Command::MoveTask {
                task_id: drag.active_id.clone(),
                from,
                to,
                to_index: group.tasks.len(),
            })
        }
        (DragKind::Task, DragKind::Task) => resolve_task_over_task(board, &drag.active_id, over_id),
        (DragKind::Task, DragKind::Column | DragKind::ColumnArea) => {
            let from = locate_task(board, &drag.active_id)?;
            let column = board.column(over_id)?;
            Some(Command::MoveTask {
                task_id: drag.active_id.clone(),
                from,
                to: TaskLocation::Direct {
                    column_id: column.id.clone(),
                },
                to_index: column.tasks.len(),
            })
        }
        _ => None,
    }
}

fn resolve_task_over_task(board: &Board, active_id: &str, over_id: &str) -> Option<Command> {
    let from = locate_task(board, active_id)?;
    let to = locate_task(board, over_id)?;
    let from_index = task_index(board, &from, active_id)?;
    let over_index = task_index(board, &to, over_id)?;

    if from == to {
        return Some(match &from {
            TaskLocation::Grouped { group_id, .. } => Command::ReorderGroupTasks {
                group_id: group_id.clone(),
                from: from_index,
                to: over_index,
            },
            TaskLocation::Direct { column_id } => Command::ReorderColumnTasks {
                column_id: column_id.clone(),
                from: from_index,
                to: over_index,
            },
        });
    }

    // Different lists: same column (direct <-> group, group <-> group) or
    // another column. Insert before the over-task.
    Some(Command::MoveTask {
        task_id: active_id.to_string(),
        from,
        to,
        to_index: over_index,
    })
}

/// Resolve a drop and apply it. Returns the new board, the command that ran
/// (if any) and its outcome.
pub fn resolve_and_apply(
    board: &Board,
    drag: &DragEnd,
    column_move_mode: bool,
) -> (Board, Option<Command>, Outcome) {
    match resolve(board, drag, column_move_mode) {
        Some(cmd) => {
            let (next, outcome) = command::apply(board, &cmd);
            (next, Some(cmd), outcome)
        }
        None => (board.clone(), None, Outcome::Unchanged),
    }
}
