use indexmap::IndexMap;
use serde_json::Value;

use super::board::Board;

/// Prefix for the storage key of every board
pub const BOARD_KEY_PREFIX: &str = "board:";

/// Storage key for a board with the given name
pub fn board_key(name: &str) -> String {
    format!("{}{}", BOARD_KEY_PREFIX, name)
}

/// Board name from a storage key (the key itself if it isn't board-prefixed)
pub fn board_name(key: &str) -> &str {
    key.strip_prefix(BOARD_KEY_PREFIX).unwrap_or(key)
}

/// Auxiliary fields carried alongside the boards in exports.
/// Their shape belongs to the presentation layer, so they are kept opaque.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extras {
    pub notes: Value,
    pub intentions: Value,
    pub top_priorities: Value,
    pub compact_priorities_hidden: bool,
}

/// Everything that is persisted: all boards plus display order and selection
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workspace {
    /// Boards by storage key
    pub boards: IndexMap<String, Board>,
    /// Display order of board keys
    pub board_order: Vec<String>,
    /// Key of the board being worked on
    pub current: String,
    pub extras: Extras,
}

impl Workspace {
    /// A workspace holding a single board
    pub fn with_board(name: &str, board: Board) -> Self {
        let key = board_key(name);
        let mut boards = IndexMap::new();
        boards.insert(key.clone(), board);
        Workspace {
            boards,
            board_order: vec![key.clone()],
            current: key,
            extras: Extras::default(),
        }
    }

    pub fn current_board(&self) -> Option<&Board> {
        self.boards.get(&self.current)
    }

    pub fn current_board_mut(&mut self) -> Option<&mut Board> {
        self.boards.get_mut(&self.current)
    }

    /// Boards in display order
    pub fn ordered_boards(&self) -> impl Iterator<Item = (&str, &Board)> {
        self.board_order
            .iter()
            .filter_map(|k| self.boards.get(k).map(|b| (k.as_str(), b)))
    }
}
