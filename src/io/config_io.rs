use std::fs;
use std::path::{Path, PathBuf};

use toml_edit::DocumentMut;

use crate::model::AppConfig;

pub const CONFIG_FILE: &str = "stackboard.toml";

/// Environment variable naming the data directory
pub const DATA_DIR_ENV: &str = "STACKBOARD_DIR";

/// Written by `sb init`. Every key is optional.
pub const CONFIG_TEMPLATE: &str = r##"# stackboard configuration

[board]
# Board created when the store is empty
default_title = "My Board"
default_columns = ["To Do", "In Progress", "Done"]

[drag]
# Dragging a column only reorders columns while this is on
column_move_mode = false

[publish]
# title = "Team board"
include_completed = true

[ui]
content_width = 60

[ui.tag_colors]
# urgent = "#d33"
"##;

/// Error type for config and data-directory handling
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse stackboard.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not parse stackboard.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("no data directory: set STACKBOARD_DIR or HOME, or pass -C")]
    NoDataDir,
}

/// Pick the data directory: explicit path, then `$STACKBOARD_DIR`, then
/// `$XDG_DATA_HOME/stackboard`, then `~/.local/share/stackboard`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    resolve_data_dir_from(explicit, |name| std::env::var_os(name).map(PathBuf::from))
}

fn resolve_data_dir_from(
    explicit: Option<&Path>,
    env: impl Fn(&str) -> Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    let non_empty = |name: &str| env(name).filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = non_empty(DATA_DIR_ENV) {
        return Ok(dir);
    }
    if let Some(xdg) = non_empty("XDG_DATA_HOME") {
        return Ok(xdg.join("stackboard"));
    }
    if let Some(home) = non_empty("HOME") {
        return Ok(home.join(".local").join("share").join("stackboard"));
    }
    Err(ConfigError::NoDataDir)
}

/// Read the config, returning both the parsed config and the raw toml_edit
/// document for round-trip-safe editing. A missing file reads as defaults.
pub fn read_config(data_dir: &Path) -> Result<(AppConfig, DocumentMut), ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);
    let config_text = match fs::read_to_string(&config_path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: config_path,
                source: e,
            });
        }
    };
    let config: AppConfig = toml::from_str(&config_text)?;
    let doc: DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(data_dir: &Path, doc: &DocumentMut) -> Result<(), ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);
    fs::write(&config_path, doc.to_string()).map_err(|e| ConfigError::WriteError {
        path: config_path,
        source: e,
    })
}

fn ensure_table(doc: &mut DocumentMut, name: &str) {
    if !doc.contains_key(name) {
        doc[name] = toml_edit::Item::Table(toml_edit::Table::new());
    }
}

pub fn set_column_move_mode(doc: &mut DocumentMut, on: bool) {
    ensure_table(doc, "drag");
    doc["drag"]["column_move_mode"] = toml_edit::value(on);
}

/// Set the publish color of a tag, creating `[ui.tag_colors]` if needed
pub fn set_tag_color(doc: &mut DocumentMut, tag: &str, color: &str) {
    ensure_table(doc, "ui");
    if doc["ui"].get("tag_colors").is_none() {
        doc["ui"]["tag_colors"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["ui"]["tag_colors"][tag] = toml_edit::value(color);
}
