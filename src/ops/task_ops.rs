use serde::{Deserialize, Serialize};

use crate::model::{Board, Group, Task, TaskLocation};
use crate::parse::parse_heading_block;

use super::move_within;

/// A task taken off the board, with enough context to put it back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedTask {
    pub task: Task,
    pub location: TaskLocation,
    /// Index inside the container it was removed from
    pub index: usize,
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find which container holds a task: a column's direct list or one of its
/// groups. Every mutation goes through this.
pub fn locate_task(board: &Board, task_id: &str) -> Option<TaskLocation> {
    for column in &board.columns {
        if column.tasks.iter().any(|t| t.id == task_id) {
            return Some(TaskLocation::Direct {
                column_id: column.id.clone(),
            });
        }
        for group in &column.groups {
            if group.tasks.iter().any(|t| t.id == task_id) {
                return Some(TaskLocation::Grouped {
                    column_id: column.id.clone(),
                    group_id: group.id.clone(),
                });
            }
        }
    }
    None
}

/// Position of a task inside its container
pub fn task_index(board: &Board, location: &TaskLocation, task_id: &str) -> Option<usize> {
    board
        .container(location)?
        .iter()
        .position(|t| t.id == task_id)
}

pub fn find_task<'a>(board: &'a Board, task_id: &str) -> Option<&'a Task> {
    let location = locate_task(board, task_id)?;
    board.container(&location)?.iter().find(|t| t.id == task_id)
}

pub fn find_task_mut<'a>(board: &'a mut Board, task_id: &str) -> Option<&'a mut Task> {
    let location = locate_task(board, task_id)?;
    board
        .container_mut(&location)?
        .iter_mut()
        .find(|t| t.id == task_id)
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Append an empty task to a column's direct list. Returns the new ID, or
/// `None` if the column doesn't exist.
pub fn create_task(board: &mut Board, column_id: &str) -> Option<String> {
    let column = board.column_mut(column_id)?;
    let task = Task::new("");
    let id = task.id.clone();
    column.tasks.push(task);
    Some(id)
}

/// Replace a task's content in place (tags follow). Returns false if not found.
pub fn update_task_content(board: &mut Board, task_id: &str, content: &str) -> bool {
    match find_task_mut(board, task_id) {
        Some(task) => {
            task.set_content(content);
            true
        }
        None => false,
    }
}

/// Remove a task from wherever it lives.
pub fn delete_task(board: &mut Board, task_id: &str) -> Option<RemovedTask> {
    let location = locate_task(board, task_id)?;
    let tasks = board.container_mut(&location)?;
    let index = tasks.iter().position(|t| t.id == task_id)?;
    let task = tasks.remove(index);
    Some(RemovedTask {
        task,
        location,
        index,
    })
}

/// Put a task back into a container at `index` (clamped to its length).
/// Returns false if the container no longer exists.
pub fn insert_task(board: &mut Board, task: Task, location: &TaskLocation, index: usize) -> bool {
    match board.container_mut(location) {
        Some(tasks) => {
            let idx = index.min(tasks.len());
            tasks.insert(idx, task);
            true
        }
        None => false,
    }
}

pub fn toggle_task_completed(board: &mut Board, task_id: &str) -> bool {
    match find_task_mut(board, task_id) {
        Some(task) => {
            task.completed = !task.completed;
            true
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Heading conversion
// ---------------------------------------------------------------------------

/// Turn a task whose content starts with a heading into a group.
///
/// The group is appended to the task's column with one task per body line,
/// and the original task is removed. Returns the new group's ID; `None` means
/// nothing changed (no heading marker, or unknown task).
pub fn convert_task_to_group(board: &mut Board, task_id: &str, content: &str) -> Option<String> {
    let block = parse_heading_block(content)?;
    let location = locate_task(board, task_id)?;
    let column_id = location.column_id().to_string();

    let tasks = board.container_mut(&location)?;
    let index = tasks.iter().position(|t| t.id == task_id)?;
    tasks.remove(index);

    let mut group = Group::new(block.title);
    group.tasks = block.items.into_iter().map(Task::new).collect();
    let group_id = group.id.clone();

    board.column_mut(&column_id)?.groups.push(group);
    Some(group_id)
}

// ---------------------------------------------------------------------------
// Reorder / move
// ---------------------------------------------------------------------------

/// Move a task within a column's direct list
pub fn reorder_column_tasks(board: &mut Board, column_id: &str, from: usize, to: usize) -> bool {
    match board.column_mut(column_id) {
        Some(column) => move_within(&mut column.tasks, from, to),
        None => false,
    }
}

/// Move a task within a group
pub fn reorder_group_tasks(board: &mut Board, group_id: &str, from: usize, to: usize) -> bool {
    match board.group_mut(group_id) {
        Some(group) => move_within(&mut group.tasks, from, to),
        None => false,
    }
}

/// Move a task from one container to another, inserting at `to_index`
/// (clamped). Both the task's presence at `from` and the destination are
/// checked before anything is removed. Moving within one container is a
/// reorder.
pub fn move_task_across_containers(
    board: &mut Board,
    task_id: &str,
    from: &TaskLocation,
    to: &TaskLocation,
    to_index: usize,
) -> bool {
    let Some(from_index) = task_index(board, from, task_id) else {
        return false;
    };
    let Some(target_len) = board.container(to).map(|t| t.len()) else {
        return false;
    };

    if from == to {
        let to_index = to_index.min(target_len.saturating_sub(1));
        let Some(tasks) = board.container_mut(from) else {
            return false;
        };
        return move_within(tasks, from_index, to_index);
    }

    let Some(source) = board.container_mut(from) else {
        return false;
    };
    let task = source.remove(from_index);
    insert_task(board, task, to, to_index)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
