use thiserror::Error;

use crate::model::{Board, Workspace, board_key, board_name};

use super::move_within;

/// Error type for multi-board management
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("board '{0}' already exists")]
    AlreadyExists(String),
    #[error("board '{0}' not found")]
    NotFound(String),
    #[error("cannot delete the last remaining board")]
    LastBoard,
    #[error("invalid board name {0:?}")]
    InvalidName(String),
    #[error("could not serialize board: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A board taken out of the workspace, kept as JSON for undo
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedBoard {
    pub key: String,
    pub content: String,
    /// Position it held in the board order list
    pub index: usize,
}

fn validate_name(name: &str) -> Result<(), BoardError> {
    if name.trim().is_empty() || name.contains('\n') {
        return Err(BoardError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Add a board under `name`, append it to the order list and switch to it.
/// Returns its storage key.
pub fn create_board(ws: &mut Workspace, name: &str, board: Board) -> Result<String, BoardError> {
    validate_name(name)?;
    let key = board_key(name);
    if ws.boards.contains_key(&key) {
        return Err(BoardError::AlreadyExists(name.to_string()));
    }
    ws.boards.insert(key.clone(), board);
    ws.board_order.push(key.clone());
    ws.current = key.clone();
    Ok(key)
}

/// Move a board to a new name. The order list keeps its position and the
/// current selection follows.
pub fn rename_board(ws: &mut Workspace, old_name: &str, new_name: &str) -> Result<String, BoardError> {
    validate_name(new_name)?;
    let old_key = board_key(old_name);
    let new_key = board_key(new_name);
    if !ws.boards.contains_key(&old_key) {
        return Err(BoardError::NotFound(old_name.to_string()));
    }
    if old_key == new_key {
        return Ok(new_key);
    }
    if ws.boards.contains_key(&new_key) {
        return Err(BoardError::AlreadyExists(new_name.to_string()));
    }

    let Some(index) = ws.boards.get_index_of(&old_key) else {
        return Err(BoardError::NotFound(old_name.to_string()));
    };
    let Some(board) = ws.boards.shift_remove(&old_key) else {
        return Err(BoardError::NotFound(old_name.to_string()));
    };
    ws.boards.shift_insert(index, new_key.clone(), board);

    for key in &mut ws.board_order {
        if *key == old_key {
            *key = new_key.clone();
        }
    }
    if ws.current == old_key {
        ws.current = new_key.clone();
    }
    Ok(new_key)
}

/// Remove a board. The last remaining board can't be deleted. If it was the
/// current board, the first board in order becomes current.
pub fn delete_board(ws: &mut Workspace, name: &str) -> Result<RemovedBoard, BoardError> {
    let key = board_key(name);
    let Some(board) = ws.boards.get(&key) else {
        return Err(BoardError::NotFound(name.to_string()));
    };
    if ws.boards.len() <= 1 {
        return Err(BoardError::LastBoard);
    }
    let content = serde_json::to_string(board)?;
    let index = ws
        .board_order
        .iter()
        .position(|k| *k == key)
        .unwrap_or(ws.board_order.len());

    ws.boards.shift_remove(&key);
    ws.board_order.retain(|k| *k != key);
    if ws.current == key {
        ws.current = ws
            .board_order
            .first()
            .cloned()
            .or_else(|| ws.boards.keys().next().cloned())
            .unwrap_or_default();
    }
    Ok(RemovedBoard {
        key,
        content,
        index,
    })
}

/// Put a deleted board back under its key at its old order position
/// (clamped). Fails if another board has taken the key since.
pub fn restore_board(ws: &mut Workspace, key: &str, content: &str, index: usize) -> Result<(), BoardError> {
    if ws.boards.contains_key(key) {
        return Err(BoardError::AlreadyExists(board_name(key).to_string()));
    }
    let board: Board = serde_json::from_str(content)?;
    ws.boards.insert(key.to_string(), board);
    ws.board_order.retain(|k| k != key);
    let idx = index.min(ws.board_order.len());
    ws.board_order.insert(idx, key.to_string());
    Ok(())
}

pub fn switch_board(ws: &mut Workspace, name: &str) -> Result<(), BoardError> {
    let key = board_key(name);
    if !ws.boards.contains_key(&key) {
        return Err(BoardError::NotFound(name.to_string()));
    }
    ws.current = key;
    Ok(())
}

/// Move a board within the order list
pub fn reorder_boards(ws: &mut Workspace, from: usize, to: usize) -> bool {
    move_within(&mut ws.board_order, from, to)
}

/// Board names in display order
pub fn board_names(ws: &Workspace) -> Vec<&str> {
    ws.board_order.iter().map(|k| board_name(k)).collect()
}

/// Bring a stored order list in line with the boards that exist: keys with
/// no board are dropped, boards missing from the list are appended in the
/// order given.
pub fn reconcile_board_order(order: &[String], existing: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(existing.len());
    for key in order {
        if existing.contains(key) && !out.contains(key) {
            out.push(key.clone());
        }
    }
    for key in existing {
        if !out.contains(key) {
            out.push(key.clone());
        }
    }
    out
}
