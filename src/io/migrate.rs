//! Turning stored or imported board JSON into a current [`Board`].
//!
//! Version 1 boards are flat: `columns` carry no tasks and a top-level
//! `tasks` array points back at its column through `columnId`. Version 2
//! nests tasks (and groups) inside their column. Both shapes go through the
//! same normalization: IDs may be numbers, `completed` may be missing in
//! favour of a legacy `status` string, and `groups` may be absent. Tags are
//! always recomputed from task content; any stored `tags` array is ignored.

use std::collections::HashSet;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{Board, Column, DATA_VERSION, DEFAULT_BOARD_TITLE, Group, Task, new_id};
use crate::parse::extract_tags;

/// Column created for v1 tasks when the board has no columns at all
pub const ORPHAN_COLUMN_TITLE: &str = "Imported";

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("board JSON is not valid: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("board is not a JSON object")]
    NotAnObject,
}

/// A board read from JSON, with notes on what had to change
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBoard {
    pub board: Board,
    /// Version found in the input; anything below 2 was migrated
    pub source_version: u64,
    /// v1 tasks whose `columnId` matched no column
    pub orphaned_tasks: usize,
}

impl NormalizedBoard {
    pub fn migrated(&self) -> bool {
        self.source_version < u64::from(DATA_VERSION)
    }
}

pub fn board_from_str(text: &str) -> Result<NormalizedBoard, MigrateError> {
    let value: Value = serde_json::from_str(text)?;
    board_from_value(&value)
}

/// Normalize a board of any supported version
pub fn board_from_value(value: &Value) -> Result<NormalizedBoard, MigrateError> {
    let obj = value.as_object().ok_or(MigrateError::NotAnObject)?;
    let source_version = obj.get("dataVersion").and_then(Value::as_u64).unwrap_or(1);
    let mut ids = BoardIds::default();

    if source_version < u64::from(DATA_VERSION) {
        let (board, orphaned_tasks) = migrate_v1(obj, &mut ids);
        return Ok(NormalizedBoard {
            board,
            source_version,
            orphaned_tasks,
        });
    }

    let columns = array(obj, "columns")
        .iter()
        .filter_map(Value::as_object)
        .map(|c| column_from(c, &mut ids))
        .collect();
    let mut board = Board::new(title(obj));
    board.columns = columns;
    Ok(NormalizedBoard {
        board,
        source_version,
        orphaned_tasks: 0,
    })
}

/// Nest the flat v1 task list under its columns
fn migrate_v1(obj: &Map<String, Value>, ids: &mut BoardIds) -> (Board, usize) {
    let mut columns: Vec<Column> = Vec::new();
    // Original column id -> index, so tasks can find their column after
    // renumbering duplicate ids
    let mut lookup: Vec<(String, usize)> = Vec::new();
    for c in array(obj, "columns").iter().filter_map(Value::as_object) {
        let original = c.get("id").and_then(normalize_id);
        let column = column_from(c, ids);
        if let Some(original) = original {
            lookup.push((original, columns.len()));
        }
        columns.push(column);
    }

    let mut orphaned = 0;
    for t in array(obj, "tasks").iter().filter_map(Value::as_object) {
        let task = task_from(t, ids);
        let target = t
            .get("columnId")
            .and_then(normalize_id)
            .and_then(|cid| lookup.iter().find(|(id, _)| *id == cid).map(|(_, i)| *i));
        match target {
            Some(i) => columns[i].tasks.push(task),
            None => {
                orphaned += 1;
                if columns.is_empty() {
                    columns.push(Column::new(ORPHAN_COLUMN_TITLE));
                }
                columns[0].tasks.push(task);
            }
        }
    }

    let mut board = Board::new(title(obj));
    board.columns = columns;
    (board, orphaned)
}

// ---------------------------------------------------------------------------
// Entity normalization
// ---------------------------------------------------------------------------

/// IDs already handed out for one kind of entity. A repeated ID gets a
/// fresh one.
#[derive(Default)]
struct IdSet {
    seen: HashSet<String>,
}

/// Columns, groups and tasks are looked up separately, so an ID only has to
/// be unique within its own kind.
#[derive(Default)]
struct BoardIds {
    columns: IdSet,
    groups: IdSet,
    tasks: IdSet,
}

impl IdSet {
    fn claim(&mut self, raw: Option<&Value>) -> String {
        if let Some(id) = raw.and_then(normalize_id)
            && !id.is_empty()
            && self.seen.insert(id.clone())
        {
            return id;
        }
        let id = new_id();
        self.seen.insert(id.clone());
        id
    }
}

/// IDs may be stored as strings or numbers
pub fn normalize_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn title(obj: &Map<String, Value>) -> String {
    obj.get("title")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_BOARD_TITLE)
        .to_string()
}

fn array<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn string(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).and_then(Value::as_str).unwrap_or("").to_string()
}

fn column_from(obj: &Map<String, Value>, ids: &mut BoardIds) -> Column {
    Column {
        id: ids.columns.claim(obj.get("id")),
        title: string(obj, "title"),
        tasks: array(obj, "tasks")
            .iter()
            .filter_map(Value::as_object)
            .map(|t| task_from(t, ids))
            .collect(),
        groups: array(obj, "groups")
            .iter()
            .filter_map(Value::as_object)
            .map(|g| group_from(g, ids))
            .collect(),
        color: obj.get("color").and_then(Value::as_str).map(str::to_string),
    }
}

fn group_from(obj: &Map<String, Value>, ids: &mut BoardIds) -> Group {
    Group {
        id: ids.groups.claim(obj.get("id")),
        title: string(obj, "title"),
        tasks: array(obj, "tasks")
            .iter()
            .filter_map(Value::as_object)
            .map(|t| task_from(t, ids))
            .collect(),
        completed: obj.get("completed").and_then(Value::as_bool),
    }
}

fn task_from(obj: &Map<String, Value>, ids: &mut BoardIds) -> Task {
    let content = string(obj, "content");
    let completed = match obj.get("completed").and_then(Value::as_bool) {
        Some(done) => done,
        None => obj
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(|s| matches!(s, "done" | "completed")),
    };
    Task {
        id: ids.tasks.claim(obj.get("id")),
        tags: extract_tags(&content),
        content,
        completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn v1_tasks_nest_under_their_columns() {
        let v1 = json!({
            "title": "Old",
            "columns": [{"id": 1, "title": "Todo"}, {"id": 2, "title": "Done"}],
            "tasks": [
                {"id": 10, "content": "a #x", "columnId": 1},
                {"id": 11, "content": "b", "columnId": 2, "completed": true},
                {"id": 12, "content": "c", "columnId": 1},
            ]
        });
        let out = board_from_value(&v1).unwrap();
        assert!(out.migrated());
        assert_eq!(out.orphaned_tasks, 0);
        let board = out.board;
        assert_eq!(board.title, "Old");
        assert_eq!(board.data_version, DATA_VERSION);
        assert_eq!(board.columns[0].id, "1");
        let todo: Vec<&str> = board.columns[0].tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(todo, vec!["10", "12"]);
        assert_eq!(board.columns[0].tasks[0].tags, vec!["x"]);
        assert!(board.columns[1].tasks[0].completed);
        assert!(board.columns.iter().all(|c| c.groups.is_empty()));
    }

    #[test]
    fn v1_orphans_go_to_first_column() {
        let v1 = json!({
            "title": "Old",
            "columns": [{"id": "a", "title": "Todo"}],
            "tasks": [{"id": "t", "content": "lost", "columnId": "zzz"}]
        });
        let out = board_from_value(&v1).unwrap();
        assert_eq!(out.orphaned_tasks, 1);
        assert_eq!(out.board.columns[0].tasks[0].content, "lost");
    }

    #[test]
    fn v1_orphans_without_columns_get_imported_column() {
        let v1 = json!({"title": "Old", "tasks": [{"id": "t", "content": "lost"}]});
        let out = board_from_value(&v1).unwrap();
        assert_eq!(out.board.columns.len(), 1);
        assert_eq!(out.board.columns[0].title, ORPHAN_COLUMN_TITLE);
        assert_eq!(out.board.columns[0].tasks.len(), 1);
    }

    #[test]
    fn v2_is_normalized_not_migrated() {
        let v2 = json!({
            "title": "New",
            "dataVersion": 2,
            "columns": [{
                "id": 7,
                "title": "Doing",
                "color": "#abc",
                "tasks": [{"id": 3, "content": "legacy", "status": "done"}]
            }]
        });
        let out = board_from_value(&v2).unwrap();
        assert!(!out.migrated());
        let column = &out.board.columns[0];
        assert_eq!(column.id, "7");
        assert_eq!(column.color.as_deref(), Some("#abc"));
        assert!(column.groups.is_empty());
        assert!(column.tasks[0].completed);
        assert_eq!(column.tasks[0].id, "3");
    }

    #[test]
    fn status_other_than_done_is_incomplete() {
        let v2 = json!({"title": "B", "dataVersion": 2, "columns": [{
            "id": "c", "title": "C",
            "tasks": [{"id": "t", "content": "x", "status": "todo"}]
        }]});
        let out = board_from_value(&v2).unwrap();
        assert!(!out.board.columns[0].tasks[0].completed);
    }

    #[test]
    fn duplicate_ids_are_replaced() {
        let v2 = json!({"title": "B", "dataVersion": 2, "columns": [{
            "id": "c", "title": "C",
            "tasks": [{"id": 1, "content": "x"}, {"id": 1, "content": "y"}]
        }]});
        let board = board_from_value(&v2).unwrap().board;
        let tasks = &board.columns[0].tasks;
        assert_eq!(tasks[0].id, "1");
        assert_ne!(tasks[1].id, "1");
        assert_eq!(tasks[1].id.len(), 32);
    }

    #[test]
    fn ids_only_need_to_be_unique_per_kind() {
        let v2 = json!({"title": "B", "dataVersion": 2, "columns": [{
            "id": "1", "title": "C",
            "tasks": [{"id": "1", "content": "x"}],
            "groups": [{"id": "1", "title": "G", "tasks": [{"id": "2", "content": "y"}]}]
        }, {
            "id": "2", "title": "D",
            "groups": [{"id": "1", "title": "H"}]
        }]});
        let board = board_from_value(&v2).unwrap().board;
        assert_eq!(board.columns[0].id, "1");
        assert_eq!(board.columns[0].tasks[0].id, "1");
        assert_eq!(board.columns[0].groups[0].id, "1");
        assert_eq!(board.columns[0].groups[0].tasks[0].id, "2");
        assert_eq!(board.columns[1].id, "2");
        assert_ne!(board.columns[1].groups[0].id, "1");
    }

    #[test]
    fn stored_tags_are_replaced_by_content_tags() {
        let v2 = json!({"title": "B", "dataVersion": 2, "columns": [{
            "id": "c", "title": "C",
            "tasks": [
                {"id": "a", "content": "plain", "tags": ["stale"]},
                {"id": "b", "content": "fix #bike", "tags": []},
            ]
        }]});
        let board = board_from_value(&v2).unwrap().board;
        let tasks = &board.columns[0].tasks;
        assert_eq!(tasks[0].tags, Vec::<String>::new());
        assert_eq!(tasks[1].tags, vec!["bike"]);
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(matches!(board_from_str("{oops"), Err(MigrateError::InvalidJson(_))));
        assert!(matches!(board_from_str("[1,2]"), Err(MigrateError::NotAnObject)));
    }
}
