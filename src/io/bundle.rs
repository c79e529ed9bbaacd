use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::{BOARD_KEY_PREFIX, Board, Extras, Workspace, board_key};
use crate::ops::board_ops::reconcile_board_order;

use super::board_io::{list_board_keys, save_board, save_extras};
use super::migrate::{MigrateError, board_from_value};
use super::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use super::store::{
    BOARD_ORDER_KEY, CURRENT_BOARD_KEY, KeyValueStore, StoreError, UNDO_LEDGER_KEY,
};

/// Format version written into every export
pub const BUNDLE_VERSION: u32 = 1;

/// Everything needed to rebuild a workspace elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    /// Boards by storage key
    pub boards: IndexMap<String, Board>,
    pub board_order: Vec<String>,
    pub notes: Value,
    pub intentions: Value,
    pub top_priorities: Value,
    pub compact_priorities_hidden: bool,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import file is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("import file is not a JSON object")]
    NotAnObject,
    #[error("import file has no 'boards' object")]
    MissingBoards,
    #[error("import file has no 'boardOrder' array")]
    MissingBoardOrder,
    #[error("import file contains no boards")]
    NoBoards,
    #[error("board '{key}' could not be read: {source}")]
    InvalidBoard { key: String, source: MigrateError },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Snapshot the workspace as an export bundle
pub fn export_bundle(ws: &Workspace) -> ExportBundle {
    export_bundle_at(ws, Utc::now())
}

pub fn export_bundle_at(ws: &Workspace, exported_at: DateTime<Utc>) -> ExportBundle {
    ExportBundle {
        version: BUNDLE_VERSION,
        exported_at,
        boards: ws.boards.clone(),
        board_order: ws.board_order.clone(),
        notes: ws.extras.notes.clone(),
        intentions: ws.extras.intentions.clone(),
        top_priorities: ws.extras.top_priorities.clone(),
        compact_priorities_hidden: ws.extras.compact_priorities_hidden,
    }
}

/// A validated, normalized import, not yet written anywhere
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedBundle {
    pub boards: IndexMap<String, Board>,
    pub board_order: Vec<String>,
    pub extras: Extras,
    /// Things that were adjusted or dropped on the way in
    pub warnings: Vec<String>,
}

impl ImportedBundle {
    /// The workspace this import will produce: first board in order is current
    pub fn to_workspace(&self) -> Workspace {
        Workspace {
            boards: self.boards.clone(),
            board_order: self.board_order.clone(),
            current: self.board_order.first().cloned().unwrap_or_default(),
            extras: self.extras.clone(),
        }
    }
}

/// Board keys in a bundle may be bare names
fn storage_key(key: &str) -> String {
    if key.starts_with(BOARD_KEY_PREFIX) {
        key.to_string()
    } else {
        board_key(key)
    }
}

/// Parse and validate a bundle. Nothing is written; any error leaves the
/// store untouched.
pub fn parse_import(text: &str) -> Result<ImportedBundle, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    let obj = value.as_object().ok_or(ImportError::NotAnObject)?;
    let boards_obj = obj
        .get("boards")
        .and_then(Value::as_object)
        .ok_or(ImportError::MissingBoards)?;
    let order_arr = obj
        .get("boardOrder")
        .and_then(Value::as_array)
        .ok_or(ImportError::MissingBoardOrder)?;

    let mut warnings = Vec::new();
    let mut boards = IndexMap::new();
    for (key, board_value) in boards_obj {
        let normalized = board_from_value(board_value).map_err(|source| ImportError::InvalidBoard {
            key: key.clone(),
            source,
        })?;
        if normalized.migrated() {
            warnings.push(format!(
                "board '{}' upgraded from version {}",
                key, normalized.source_version
            ));
        }
        if normalized.orphaned_tasks > 0 {
            warnings.push(format!(
                "board '{}': {} task(s) without a column moved to the first column",
                key, normalized.orphaned_tasks
            ));
        }
        boards.insert(storage_key(key), normalized.board);
    }
    if boards.is_empty() {
        return Err(ImportError::NoBoards);
    }

    let mut order = Vec::new();
    for entry in order_arr {
        match entry.as_str() {
            Some(key) => order.push(storage_key(key)),
            None => warnings.push(format!("boardOrder entry {} is not a string", entry)),
        }
    }
    for key in &order {
        if !boards.contains_key(key) {
            warnings.push(format!("boardOrder entry '{}' has no board", key));
        }
    }
    let existing: Vec<String> = boards.keys().cloned().collect();
    let board_order = reconcile_board_order(&order, &existing);

    let top_priorities = match obj.get("topPriorities") {
        Some(v) if !v.is_null() => v.clone(),
        _ => obj.get("pinnedPriorities").cloned().unwrap_or(Value::Null),
    };
    let extras = Extras {
        notes: obj.get("notes").cloned().unwrap_or(Value::Null),
        intentions: obj.get("intentions").cloned().unwrap_or(Value::Null),
        top_priorities,
        compact_priorities_hidden: obj
            .get("compactPrioritiesHidden")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    };

    Ok(ImportedBundle {
        boards,
        board_order,
        extras,
        warnings,
    })
}

/// Replace every stored board with the imported set. The undo history
/// refers to the replaced boards, so it is cleared too.
pub fn apply_import(store: &mut dyn KeyValueStore, imported: &ImportedBundle) -> Result<(), ImportError> {
    for key in list_board_keys(store)? {
        store.remove(&key)?;
    }
    for (key, board) in &imported.boards {
        save_board(store, key, board)?;
    }
    let ws = imported.to_workspace();
    store.set(BOARD_ORDER_KEY, &serde_json::to_string(&ws.board_order)?)?;
    store.set(CURRENT_BOARD_KEY, &serde_json::to_string(&ws.current)?)?;
    save_extras(store, &ws.extras)?;
    store.remove(UNDO_LEDGER_KEY)?;

    if !imported.warnings.is_empty() {
        log_recovery(
            store,
            RecoveryEntry::new(RecoveryCategory::Import, "bundle adjusted on import")
                .field("Boards", imported.boards.len().to_string())
                .body(imported.warnings.join("\n")),
        );
    }
    Ok(())
}
