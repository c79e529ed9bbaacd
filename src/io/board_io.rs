use serde_json::Value;

use crate::model::{
    AppConfig, BOARD_KEY_PREFIX, Board, DATA_VERSION, Extras, Workspace, board_key,
};
use crate::ops::board_ops::reconcile_board_order;
use crate::ops::undo::UndoLedger;

use super::migrate::board_from_str;
use super::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use super::store::{
    BOARD_ORDER_KEY, COMPACT_PRIORITIES_HIDDEN_KEY, CURRENT_BOARD_KEY, INTENTIONS_KEY,
    KeyValueStore, NOTES_KEY, StoreError, TOP_PRIORITIES_KEY, UNDO_LEDGER_KEY,
};

/// Every `board:`-prefixed key, in storage order
pub fn list_board_keys(store: &dyn KeyValueStore) -> Result<Vec<String>, StoreError> {
    Ok(store
        .keys()?
        .into_iter()
        .filter(|k| k.starts_with(BOARD_KEY_PREFIX))
        .collect())
}

/// Load one board.
///
/// Older layouts are migrated and written back under the same key.
/// Unreadable JSON is kept in the recovery log and replaced (in the store
/// too) by a fresh default board. Returns `None` if nothing is stored under
/// `key`.
pub fn load_board(
    store: &mut dyn KeyValueStore,
    key: &str,
    config: &AppConfig,
) -> Result<Option<Board>, StoreError> {
    let Some(text) = store.get(key)? else {
        return Ok(None);
    };

    let normalized = match board_from_str(&text) {
        Ok(n) => n,
        Err(e) => {
            log_recovery(
                store,
                RecoveryEntry::new(RecoveryCategory::Parser, "unreadable board replaced by default")
                    .field("Key", key)
                    .field("Reason", e.to_string())
                    .body(text),
            );
            let board = config.board.new_board();
            save_board(store, key, &board)?;
            return Ok(Some(board));
        }
    };

    if normalized.migrated() {
        let mut entry = RecoveryEntry::new(RecoveryCategory::Migration, "board upgraded")
            .field("Key", key)
            .field("From", normalized.source_version.to_string())
            .field("To", DATA_VERSION.to_string());
        if normalized.orphaned_tasks > 0 {
            entry = entry.field(
                "Orphaned tasks",
                format!("{} moved to '{}'", normalized.orphaned_tasks, first_column_title(&normalized.board)),
            );
        }
        log_recovery(store, entry.body(text));
        save_board(store, key, &normalized.board)?;
    }

    Ok(Some(normalized.board))
}

fn first_column_title(board: &Board) -> &str {
    board.columns.first().map(|c| c.title.as_str()).unwrap_or("")
}

/// Write a board at the current data version
pub fn save_board(store: &mut dyn KeyValueStore, key: &str, board: &Board) -> Result<(), StoreError> {
    let text = if board.data_version == DATA_VERSION {
        serde_json::to_string(board)?
    } else {
        let mut current = board.clone();
        current.data_version = DATA_VERSION;
        serde_json::to_string(&current)?
    };
    store.set(key, &text)
}

/// Stored board order, reconciled against the boards that exist
pub fn load_board_order(
    store: &mut dyn KeyValueStore,
    existing: &[String],
) -> Result<Vec<String>, StoreError> {
    let stored: Vec<String> = match store.get(BOARD_ORDER_KEY)? {
        None => Vec::new(),
        Some(text) => match serde_json::from_str(&text) {
            Ok(order) => order,
            Err(e) => {
                log_recovery(
                    store,
                    RecoveryEntry::new(RecoveryCategory::Parser, "unreadable board order rebuilt")
                        .field("Key", BOARD_ORDER_KEY)
                        .field("Reason", e.to_string())
                        .body(text),
                );
                Vec::new()
            }
        },
    };
    Ok(reconcile_board_order(&stored, existing))
}

/// Read a JSON value; absent or unreadable reads as `null`
fn load_value(store: &dyn KeyValueStore, key: &str) -> Result<Value, StoreError> {
    Ok(store
        .get(key)?
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or(Value::Null))
}

fn save_value(store: &mut dyn KeyValueStore, key: &str, value: &Value) -> Result<(), StoreError> {
    if value.is_null() {
        store.remove(key)
    } else {
        store.set(key, &serde_json::to_string(value)?)
    }
}

pub fn load_extras(store: &dyn KeyValueStore) -> Result<Extras, StoreError> {
    Ok(Extras {
        notes: load_value(store, NOTES_KEY)?,
        intentions: load_value(store, INTENTIONS_KEY)?,
        top_priorities: load_value(store, TOP_PRIORITIES_KEY)?,
        compact_priorities_hidden: load_value(store, COMPACT_PRIORITIES_HIDDEN_KEY)?
            .as_bool()
            .unwrap_or(false),
    })
}

pub fn save_extras(store: &mut dyn KeyValueStore, extras: &Extras) -> Result<(), StoreError> {
    save_value(store, NOTES_KEY, &extras.notes)?;
    save_value(store, INTENTIONS_KEY, &extras.intentions)?;
    save_value(store, TOP_PRIORITIES_KEY, &extras.top_priorities)?;
    save_value(
        store,
        COMPACT_PRIORITIES_HIDDEN_KEY,
        &Value::Bool(extras.compact_priorities_hidden),
    )
}

/// Load every board plus order, selection and extras. An empty store gets
/// the configured default board, which is saved right away.
pub fn load_workspace(store: &mut dyn KeyValueStore, config: &AppConfig) -> Result<Workspace, StoreError> {
    let keys = list_board_keys(store)?;
    let mut ws = Workspace::default();

    for key in &keys {
        if let Some(board) = load_board(store, key, config)? {
            ws.boards.insert(key.clone(), board);
        }
    }

    if ws.boards.is_empty() {
        let key = board_key(&config.board.default_title);
        let board = config.board.new_board();
        save_board(store, &key, &board)?;
        ws.boards.insert(key, board);
    }

    let existing: Vec<String> = ws.boards.keys().cloned().collect();
    ws.board_order = load_board_order(store, &existing)?;

    let stored_current = load_value(store, CURRENT_BOARD_KEY)?;
    ws.current = match stored_current.as_str() {
        Some(key) if ws.boards.contains_key(key) => key.to_string(),
        _ => ws.board_order.first().cloned().unwrap_or_default(),
    };

    ws.extras = load_extras(store)?;
    Ok(ws)
}

/// Write the whole workspace. Stored boards that are no longer in it are
/// removed.
pub fn save_workspace(store: &mut dyn KeyValueStore, ws: &Workspace) -> Result<(), StoreError> {
    for (key, board) in &ws.boards {
        save_board(store, key, board)?;
    }
    for key in list_board_keys(store)? {
        if !ws.boards.contains_key(&key) {
            store.remove(&key)?;
        }
    }
    store.set(BOARD_ORDER_KEY, &serde_json::to_string(&ws.board_order)?)?;
    store.set(CURRENT_BOARD_KEY, &serde_json::to_string(&ws.current)?)?;
    save_extras(store, &ws.extras)
}

/// The persisted undo ledger. An unreadable ledger is logged and starts over.
pub fn load_ledger(store: &mut dyn KeyValueStore) -> Result<UndoLedger, StoreError> {
    let Some(text) = store.get(UNDO_LEDGER_KEY)? else {
        return Ok(UndoLedger::new());
    };
    match serde_json::from_str(&text) {
        Ok(ledger) => Ok(ledger),
        Err(e) => {
            log_recovery(
                store,
                RecoveryEntry::new(RecoveryCategory::Parser, "unreadable undo history discarded")
                    .field("Key", UNDO_LEDGER_KEY)
                    .field("Reason", e.to_string())
                    .body(text),
            );
            Ok(UndoLedger::new())
        }
    }
}

pub fn save_ledger(store: &mut dyn KeyValueStore, ledger: &UndoLedger) -> Result<(), StoreError> {
    store.set(UNDO_LEDGER_KEY, &serde_json::to_string(ledger)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::recovery::read_recovery_entries;
    use crate::io::store::MemoryStore;
    use crate::model::Task;
    use serde_json::json;

    fn config() -> AppConfig {
        AppConfig::default()
    }

    #[test]
    fn empty_store_gets_default_board() {
        let mut store = MemoryStore::new();
        let ws = load_workspace(&mut store, &config()).unwrap();
        assert_eq!(ws.current, "board:My Board");
        assert_eq!(ws.board_order, vec!["board:My Board"]);
        let board = ws.current_board().unwrap();
        let titles: Vec<&str> = board.columns.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["To Do", "In Progress", "Done"]);
        assert!(store.get("board:My Board").unwrap().is_some());
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = MemoryStore::new();
        let mut ws = load_workspace(&mut store, &config()).unwrap();
        ws.current_board_mut().unwrap().columns[0]
            .tasks
            .push(Task::new("persist me #now"));
        ws.extras.notes = json!("remember");
        ws.extras.compact_priorities_hidden = true;
        save_workspace(&mut store, &ws).unwrap();

        let loaded = load_workspace(&mut store, &config()).unwrap();
        assert_eq!(loaded, ws);
    }

    #[test]
    fn v1_board_is_migrated_and_resaved() {
        let mut store = MemoryStore::new();
        let v1 = json!({
            "title": "Legacy",
            "columns": [{"id": 1, "title": "Todo"}],
            "tasks": [{"id": 5, "content": "old task", "columnId": 1}]
        });
        store.set("board:Legacy", &v1.to_string()).unwrap();

        let board = load_board(&mut store, "board:Legacy", &config()).unwrap().unwrap();
        assert_eq!(board.columns[0].tasks[0].content, "old task");

        let saved: Value = serde_json::from_str(&store.get("board:Legacy").unwrap().unwrap()).unwrap();
        assert_eq!(saved["dataVersion"], 2);
        assert_eq!(saved["columns"][0]["tasks"][0]["id"], "5");

        let log = read_recovery_entries(&store, None, None);
        assert_eq!(log[0].category, RecoveryCategory::Migration);
    }

    #[test]
    fn malformed_board_falls_back_and_is_logged() {
        let mut store = MemoryStore::new();
        store.set("board:Broken", "{not json").unwrap();
        let board = load_board(&mut store, "board:Broken", &config()).unwrap().unwrap();
        assert_eq!(board.title, "My Board");
        assert_eq!(board.columns.len(), 3);

        let log = read_recovery_entries(&store, None, None);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].category, RecoveryCategory::Parser);
        assert_eq!(log[0].body, "{not json");

        // The replacement is stored, so the next load is quiet
        load_board(&mut store, "board:Broken", &config()).unwrap();
        assert_eq!(read_recovery_entries(&store, None, None).len(), 1);
    }

    #[test]
    fn order_is_reconciled_on_load() {
        let mut store = MemoryStore::new();
        save_board(&mut store, "board:A", &Board::new("A")).unwrap();
        save_board(&mut store, "board:B", &Board::new("B")).unwrap();
        store
            .set(BOARD_ORDER_KEY, r#"["board:gone","board:B"]"#)
            .unwrap();
        store.set(CURRENT_BOARD_KEY, r#""board:gone""#).unwrap();

        let ws = load_workspace(&mut store, &config()).unwrap();
        assert_eq!(ws.board_order, vec!["board:B", "board:A"]);
        assert_eq!(ws.current, "board:B");
    }

    #[test]
    fn save_removes_stale_board_keys() {
        let mut store = MemoryStore::new();
        save_board(&mut store, "board:Old", &Board::new("Old")).unwrap();
        let ws = Workspace::with_board("New", Board::new("New"));
        save_workspace(&mut store, &ws).unwrap();
        assert_eq!(list_board_keys(&store).unwrap(), vec!["board:New"]);
    }

    #[test]
    fn unreadable_ledger_starts_over() {
        let mut store = MemoryStore::new();
        store.set(UNDO_LEDGER_KEY, "[[[").unwrap();
        let ledger = load_ledger(&mut store).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(read_recovery_entries(&store, None, None).len(), 1);
    }
}
