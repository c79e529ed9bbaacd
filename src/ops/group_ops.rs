use crate::model::{Board, Group};

/// Append a new empty group to a column. Returns its ID, or `None` for an
/// unknown column.
pub fn create_group(board: &mut Board, column_id: &str, title: &str) -> Option<String> {
    let column = board.column_mut(column_id)?;
    let group = Group::new(title);
    let id = group.id.clone();
    column.groups.push(group);
    Some(id)
}

pub fn rename_group(board: &mut Board, group_id: &str, title: &str) -> bool {
    match board.group_mut(group_id) {
        Some(group) => {
            group.title = title.to_string();
            true
        }
        None => false,
    }
}

/// Remove a group and every task in it
pub fn delete_group(board: &mut Board, group_id: &str) -> Option<Group> {
    for column in &mut board.columns {
        if let Some(idx) = column.groups.iter().position(|g| g.id == group_id) {
            return Some(column.groups.remove(idx));
        }
    }
    None
}

/// If every member is completed, mark them all incomplete; otherwise mark
/// them all completed. The group's own flag follows.
pub fn toggle_group_completed(board: &mut Board, group_id: &str) -> bool {
    let Some(group) = board.group_mut(group_id) else {
        return false;
    };
    let target = !group.all_completed();
    for task in &mut group.tasks {
        task.completed = target;
    }
    group.completed = Some(target);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;

    fn board_with_group(states: &[bool]) -> (Board, String) {
        let mut board = Board::default_board();
        let column_id = board.columns[0].id.clone();
        let gid = create_group(&mut board, &column_id, "Errands").unwrap();
        let group = board.group_mut(&gid).unwrap();
        for (i, done) in states.iter().enumerate() {
            let mut t = Task::new(format!("task {}", i));
            t.completed = *done;
            group.tasks.push(t);
        }
        (board, gid)
    }

    fn states(board: &Board, gid: &str) -> Vec<bool> {
        let (_, group) = board.group(gid).unwrap();
        group.tasks.iter().map(|t| t.completed).collect()
    }

    #[test]
    fn create_group_unknown_column() {
        let mut board = Board::default_board();
        assert!(create_group(&mut board, "nope", "x").is_none());
    }

    #[test]
    fn rename_and_delete() {
        let (mut board, gid) = board_with_group(&[false, false]);
        assert!(rename_group(&mut board, &gid, "Chores"));
        assert_eq!(board.group(&gid).unwrap().1.title, "Chores");

        let removed = delete_group(&mut board, &gid).unwrap();
        assert_eq!(removed.tasks.len(), 2);
        assert!(board.group(&gid).is_none());
        assert_eq!(board.card_count(), 0);
        assert!(delete_group(&mut board, &gid).is_none());
    }

    #[test]
    fn toggle_partial_marks_all_complete() {
        let (mut board, gid) = board_with_group(&[true, false, false]);
        assert!(toggle_group_completed(&mut board, &gid));
        assert_eq!(states(&board, &gid), vec![true, true, true]);
        assert_eq!(board.group(&gid).unwrap().1.completed, Some(true));
    }

    #[test]
    fn toggle_all_complete_marks_all_incomplete() {
        let (mut board, gid) = board_with_group(&[true, true]);
        toggle_group_completed(&mut board, &gid);
        assert_eq!(states(&board, &gid), vec![false, false]);
    }

    #[test]
    fn toggle_twice_restores_uniform_group() {
        for initial in [vec![false, false], vec![true, true]] {
            let (mut board, gid) = board_with_group(&initial);
            toggle_group_completed(&mut board, &gid);
            toggle_group_completed(&mut board, &gid);
            assert_eq!(states(&board, &gid), initial);
        }
    }

    #[test]
    fn toggle_unknown_group() {
        let (mut board, _) = board_with_group(&[false]);
        let before = board.clone();
        assert!(!toggle_group_completed(&mut board, "missing"));
        assert_eq!(board, before);
    }
}
