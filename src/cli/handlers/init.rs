use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::board_io::{list_board_keys, load_workspace};
use crate::io::config_io::{self, CONFIG_FILE, CONFIG_TEMPLATE};
use crate::io::lock::FileLock;
use crate::io::store::{FileStore, STORE_DIR};
use crate::model::board_name;

/// What `init` did to a data directory
#[derive(Debug, PartialEq, Eq)]
struct InitReport {
    config_written: bool,
    /// Name of the board created for an empty store
    created_board: Option<String>,
}

fn init_data_dir(data_dir: &Path, force: bool) -> Result<InitReport, Box<dyn std::error::Error>> {
    fs::create_dir_all(data_dir)?;
    let _lock = FileLock::acquire_default(data_dir)?;

    let config_path = data_dir.join(CONFIG_FILE);
    let config_written = force || !config_path.exists();
    if config_written {
        fs::write(&config_path, CONFIG_TEMPLATE)?;
    }

    let (config, _) = config_io::read_config(data_dir)?;
    let mut store = FileStore::open(&data_dir.join(STORE_DIR))?;
    let was_empty = list_board_keys(&store)?.is_empty();
    let ws = load_workspace(&mut store, &config)?;

    Ok(InitReport {
        config_written,
        created_board: was_empty.then(|| board_name(&ws.current).to_string()),
    })
}

pub fn cmd_init(args: InitArgs, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let report = init_data_dir(data_dir, args.force)?;

    println!("Initialized stackboard in {}", data_dir.display());
    if report.config_written {
        println!("  config: {}", data_dir.join(CONFIG_FILE).display());
    } else {
        println!("  config: kept existing {} (use --force to overwrite)", CONFIG_FILE);
    }
    if let Some(name) = report.created_board {
        println!("  board: {}", name);
    }
    Ok(())
}
