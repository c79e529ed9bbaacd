use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Column, Task, TaskLocation, Workspace, board_name};

use super::board_ops::{self, BoardError};
use super::{column_ops, task_ops};

/// How many destructive actions are remembered
pub const UNDO_STACK_LIMIT: usize = 10;

/// A destructive action, with what is needed to reverse it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum UndoAction {
    DeleteTask {
        board_key: String,
        task: Task,
        location: TaskLocation,
        index: usize,
    },
    DeleteColumn {
        board_key: String,
        column: Column,
        index: usize,
    },
    DeleteBoard {
        board_key: String,
        /// The board as JSON at the time it was deleted
        content: String,
        index: usize,
    },
}

impl UndoAction {
    pub fn board_key(&self) -> &str {
        match self {
            UndoAction::DeleteTask { board_key, .. }
            | UndoAction::DeleteColumn { board_key, .. }
            | UndoAction::DeleteBoard { board_key, .. } => board_key,
        }
    }
}

impl fmt::Display for UndoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndoAction::DeleteTask { task, .. } => write!(f, "delete task '{}'", task.headline()),
            UndoAction::DeleteColumn { column, .. } => write!(f, "delete column '{}'", column.title),
            UndoAction::DeleteBoard { board_key, .. } => {
                write!(f, "delete board '{}'", board_name(board_key))
            }
        }
    }
}

/// An undo or redo that could not be carried out. The record stays where it
/// was, so nothing is lost.
#[derive(Debug, Error)]
#[error("cannot {verb} {action}: {source}")]
pub struct UndoError {
    verb: &'static str,
    action: String,
    #[source]
    source: BoardError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoRecord {
    pub action: UndoAction,
    pub timestamp: DateTime<Utc>,
}

/// Undo and redo stacks of destructive actions.
///
/// Recording a new action clears the redo stack; only the most recent
/// [`UNDO_STACK_LIMIT`] actions are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UndoLedger {
    #[serde(default)]
    undo: Vec<UndoRecord>,
    #[serde(default)]
    redo: Vec<UndoRecord>,
}

impl UndoLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action that was just performed
    pub fn record(&mut self, action: UndoAction) {
        self.record_at(action, Utc::now());
    }

    pub fn record_at(&mut self, action: UndoAction, timestamp: DateTime<Utc>) {
        self.undo.push(UndoRecord { action, timestamp });
        if self.undo.len() > UNDO_STACK_LIMIT {
            self.undo.drain(..self.undo.len() - UNDO_STACK_LIMIT);
        }
        self.redo.clear();
    }

    /// Reverse the most recent action and move it to the redo stack.
    /// Returns the action that was undone, or `None` if there was nothing.
    /// On error the workspace is untouched and the record stays on the undo
    /// stack.
    pub fn undo(&mut self, ws: &mut Workspace) -> Result<Option<&UndoAction>, UndoError> {
        let Some(record) = self.undo.pop() else {
            return Ok(None);
        };
        if let Err(source) = apply_inverse(&record.action, ws) {
            let err = UndoError {
                verb: "undo",
                action: record.action.to_string(),
                source,
            };
            self.undo.push(record);
            return Err(err);
        }
        self.redo.push(record);
        Ok(self.redo.last().map(|r| &r.action))
    }

    /// Perform the most recently undone action again and move it back to
    /// the undo stack. On error the record stays on the redo stack.
    pub fn redo(&mut self, ws: &mut Workspace) -> Result<Option<&UndoAction>, UndoError> {
        let Some(record) = self.redo.pop() else {
            return Ok(None);
        };
        if let Err(source) = apply_forward(&record.action, ws) {
            let err = UndoError {
                verb: "redo",
                action: record.action.to_string(),
                source,
            };
            self.redo.push(record);
            return Err(err);
        }
        self.undo.push(record);
        Ok(self.undo.last().map(|r| &r.action))
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}

/// Re-insert whatever the action removed. Tasks and columns whose target
/// disappeared since are skipped. A board is never restored over one that
/// took its name in the meantime.
fn apply_inverse(action: &UndoAction, ws: &mut Workspace) -> Result<(), BoardError> {
    match action {
        UndoAction::DeleteTask {
            board_key,
            task,
            location,
            index,
        } => {
            let Some(board) = ws.boards.get_mut(board_key) else {
                return Ok(());
            };
            if task_ops::locate_task(board, &task.id).is_some() {
                return Ok(());
            }
            if board.container(location).is_some() {
                task_ops::insert_task(board, task.clone(), location, *index);
            } else {
                // Group is gone: fall back to the column's own list
                let fallback = TaskLocation::Direct {
                    column_id: location.column_id().to_string(),
                };
                task_ops::insert_task(board, task.clone(), &fallback, *index);
            }
        }
        UndoAction::DeleteColumn {
            board_key,
            column,
            index,
        } => {
            let Some(board) = ws.boards.get_mut(board_key) else {
                return Ok(());
            };
            if board.column(&column.id).is_none() {
                column_ops::restore_column(board, column.clone(), *index);
            }
        }
        UndoAction::DeleteBoard {
            board_key,
            content,
            index,
        } => board_ops::restore_board(ws, board_key, content, *index)?,
    }
    Ok(())
}

/// Perform the destructive action again. A board that is already gone counts
/// as deleted.
fn apply_forward(action: &UndoAction, ws: &mut Workspace) -> Result<(), BoardError> {
    match action {
        UndoAction::DeleteTask {
            board_key, task, ..
        } => {
            if let Some(board) = ws.boards.get_mut(board_key) {
                task_ops::delete_task(board, &task.id);
            }
        }
        UndoAction::DeleteColumn {
            board_key, column, ..
        } => {
            if let Some(board) = ws.boards.get_mut(board_key) {
                column_ops::delete_column(board, &column.id);
            }
        }
        UndoAction::DeleteBoard { board_key, .. } => {
            match board_ops::delete_board(ws, board_name(board_key)) {
                Ok(_) | Err(BoardError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
    }
    Ok(())
}
