pub mod board_ops;
pub mod column_ops;
pub mod command;
pub mod drag;
pub mod group_ops;
pub mod search;
pub mod task_ops;
pub mod undo;

/// Stable array move: take the element at `from` and re-insert it so it ends
/// up at `to`, keeping everything else in relative order. Out-of-range
/// indexes are a no-op; returns whether anything was in range.
pub fn move_within<T>(list: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= list.len() || to >= list.len() {
        return false;
    }
    if from != to {
        let item = list.remove(from);
        list.insert(to, item);
    }
    true
}
