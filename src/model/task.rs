use serde::{Deserialize, Serialize};

use super::id::new_id;
use crate::parse::extract_tags;

/// A single card on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque identifier, unique within a board
    pub id: String,
    /// Free text; the first line is what shows on the card
    pub content: String,
    #[serde(default)]
    pub completed: bool,
    /// Tags (without the `#` prefix), derived from `content`
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Task {
    /// Create a new incomplete task with a fresh ID and tags derived from `content`
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        Task {
            id: new_id(),
            tags: extract_tags(&content),
            content,
            completed: false,
        }
    }

    /// Replace the content and recompute the tag cache
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.refresh_tags();
    }

    /// Recompute `tags` from `content`
    pub fn refresh_tags(&mut self) {
        self.tags = extract_tags(&self.content);
    }

    /// First line of the content, which is what a card shows as its title
    pub fn headline(&self) -> &str {
        self.content.lines().next().unwrap_or("")
    }
}
