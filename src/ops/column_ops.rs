use crate::model::{Board, Column};

use super::move_within;

/// Append a new empty column. Returns its ID.
pub fn create_column(board: &mut Board, title: &str) -> String {
    let column = Column::new(title);
    let id = column.id.clone();
    board.columns.push(column);
    id
}

pub fn rename_column(board: &mut Board, column_id: &str, title: &str) -> bool {
    match board.column_mut(column_id) {
        Some(column) => {
            column.title = title.to_string();
            true
        }
        None => false,
    }
}

/// Set or clear a column's accent color
pub fn set_column_color(board: &mut Board, column_id: &str, color: Option<&str>) -> bool {
    match board.column_mut(column_id) {
        Some(column) => {
            column.color = color.map(str::to_string);
            true
        }
        None => false,
    }
}

/// Remove a column with all of its tasks and groups.
/// Returns the column and the index it occupied.
pub fn delete_column(board: &mut Board, column_id: &str) -> Option<(Column, usize)> {
    let index = board.column_index(column_id)?;
    Some((board.columns.remove(index), index))
}

/// Put a deleted column back at its original index (clamped)
pub fn restore_column(board: &mut Board, column: Column, index: usize) {
    let idx = index.min(board.columns.len());
    board.columns.insert(idx, column);
}

pub fn reorder_columns(board: &mut Board, from: usize, to: usize) -> bool {
    move_within(&mut board.columns, from, to)
}
