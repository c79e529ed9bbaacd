use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::board::{Board, DEFAULT_BOARD_TITLE, DEFAULT_COLUMNS};

/// Configuration from stackboard.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Shape of the board created when none exists (or one fails to load)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_board_title")]
    pub default_title: String,
    #[serde(default = "default_columns")]
    pub default_columns: Vec<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            default_title: default_board_title(),
            default_columns: default_columns(),
        }
    }
}

impl BoardConfig {
    /// A fresh board with the configured title and columns
    pub fn new_board(&self) -> Board {
        Board::with_columns(self.default_title.clone(), &self.default_columns)
    }
}

fn default_board_title() -> String {
    DEFAULT_BOARD_TITLE.to_string()
}

fn default_columns() -> Vec<String> {
    DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DragConfig {
    /// Columns can only be reordered by dragging while this is on
    #[serde(default)]
    pub column_move_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Document title for published pages (default: the board title)
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_true")]
    pub include_completed: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            title: None,
            include_completed: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Display cells for task content in text listings
    #[serde(default = "default_content_width")]
    pub content_width: usize,
    /// Tag name (without `#`) → CSS color, used for published tag pills
    #[serde(default)]
    pub tag_colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            content_width: default_content_width(),
            tag_colors: HashMap::new(),
        }
    }
}

fn default_content_width() -> usize {
    60
}
