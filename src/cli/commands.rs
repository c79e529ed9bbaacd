use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sb", about = concat!("[#] stackboard v", env!("CARGO_PKG_VERSION"), " - a kanban board in your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory, config file and default board
    Init(InitArgs),
    /// Show a board (default: the current one)
    Show(ShowArgs),
    /// List all boards
    Boards,
    /// Board management
    Board(BoardCmd),
    /// Column management
    Column(ColumnCmd),
    /// Group management
    Group(GroupCmd),
    /// Add a task to the bottom of a column
    Add(AddArgs),
    /// Replace a task's content
    Edit(EditArgs),
    /// Delete a task (undoable)
    Delete(TaskIdArg),
    /// Toggle a task between done and not done
    Toggle(TaskIdArg),
    /// Turn a task whose content starts with a heading into a group
    Convert(TaskIdArg),
    /// Move a task to a column or group
    Mv(MvArgs),
    /// Apply the result of a drag gesture
    Drag(DragArgs),
    /// Undo the last delete
    Undo,
    /// Redo the last undone delete
    Redo,
    /// List tags on the current board with counts
    Tags,
    /// Show tasks carrying a tag
    Filter(FilterArgs),
    /// Search task content, group titles and column titles by regex
    Search(SearchArgs),
    /// Export every board to a JSON bundle
    Export(ExportArgs),
    /// Replace all boards with the contents of a JSON bundle
    Import(ImportArgs),
    /// Render boards as a self-contained HTML page
    Publish(PublishArgs),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
    /// Change settings in stackboard.toml
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Init / read args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing stackboard.toml with the template
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Board name (default: current board)
    pub board: Option<String>,
    /// Print full task IDs
    #[arg(long)]
    pub full_ids: bool,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Tag, with or without the leading '#'
    pub tag: String,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern to search for
    pub pattern: String,
    /// Search every board, not just the current one
    #[arg(long)]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TaskIdArg {
    /// Task ID (any unique prefix)
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Column title or ID
    pub column: String,
    /// Task content (default: empty)
    pub content: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID (any unique prefix)
    pub id: String,
    /// New content
    pub content: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task ID (any unique prefix)
    pub id: String,
    /// Target column (title or ID); the task goes to its direct list
    #[arg(long, conflicts_with = "group", required_unless_present = "group")]
    pub column: Option<String>,
    /// Target group (title or ID)
    #[arg(long)]
    pub group: Option<String>,
    /// Position in the target list, 0-indexed (default: end)
    #[arg(long)]
    pub index: Option<usize>,
}

#[derive(Args)]
pub struct DragArgs {
    /// Kind of the dragged item: task, column or group
    pub active_kind: String,
    /// ID of the dragged item
    pub active_id: String,
    /// Kind of the drop target: task, column, group or column-area
    pub over_kind: String,
    /// ID of the drop target
    pub over_id: String,
    /// Allow column reordering for this call regardless of config
    #[arg(long)]
    pub column_move: bool,
}

// ---------------------------------------------------------------------------
// Board management
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct BoardCmd {
    #[command(subcommand)]
    pub action: BoardAction,
}

#[derive(Subcommand)]
pub enum BoardAction {
    /// Create a board with the default columns and switch to it
    New(BoardNameArg),
    /// Rename a board
    Rename(BoardRenameArgs),
    /// Delete a board (undoable)
    Delete(BoardNameArg),
    /// Make a board current
    Switch(BoardNameArg),
    /// Move a board within the board order
    Mv(BoardMvArgs),
}

#[derive(Args)]
pub struct BoardNameArg {
    /// Board name
    pub name: String,
}

#[derive(Args)]
pub struct BoardRenameArgs {
    /// Current board name
    pub name: String,
    /// New board name
    pub new_name: String,
}

#[derive(Args)]
pub struct BoardMvArgs {
    /// Board name
    pub name: String,
    /// New position (0-indexed)
    pub position: usize,
}

// ---------------------------------------------------------------------------
// Column management
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ColumnCmd {
    #[command(subcommand)]
    pub action: ColumnAction,
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// Add a column at the right end of the board
    Add(ColumnAddArgs),
    /// Rename a column
    Rename(ColumnRenameArgs),
    /// Delete a column and everything in it (undoable)
    Delete(ColumnIdArg),
    /// Move a column to a new position
    Mv(ColumnMvArgs),
    /// Set or clear a column's accent color
    Color(ColumnColorArgs),
}

#[derive(Args)]
pub struct ColumnAddArgs {
    /// Column title
    pub title: String,
}

#[derive(Args)]
pub struct ColumnIdArg {
    /// Column title or ID
    pub column: String,
}

#[derive(Args)]
pub struct ColumnRenameArgs {
    /// Column title or ID
    pub column: String,
    /// New title
    pub title: String,
}

#[derive(Args)]
pub struct ColumnMvArgs {
    /// Column title or ID
    pub column: String,
    /// New position (0-indexed)
    pub position: usize,
}

#[derive(Args)]
pub struct ColumnColorArgs {
    /// Column title or ID
    pub column: String,
    /// Color, e.g. "#4488ff" (omit with --clear)
    pub color: Option<String>,
    /// Remove the color
    #[arg(long, conflicts_with = "color")]
    pub clear: bool,
}

// ---------------------------------------------------------------------------
// Group management
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct GroupCmd {
    #[command(subcommand)]
    pub action: GroupAction,
}

#[derive(Subcommand)]
pub enum GroupAction {
    /// Add an empty group to a column
    Add(GroupAddArgs),
    /// Rename a group
    Rename(GroupRenameArgs),
    /// Delete a group and its tasks
    Delete(GroupIdArg),
    /// Mark every task in a group done, or all not done
    Toggle(GroupIdArg),
}

#[derive(Args)]
pub struct GroupAddArgs {
    /// Column title or ID
    pub column: String,
    /// Group title
    pub title: String,
}

#[derive(Args)]
pub struct GroupIdArg {
    /// Group title or ID
    pub group: String,
}

#[derive(Args)]
pub struct GroupRenameArgs {
    /// Group title or ID
    pub group: String,
    /// New title
    pub title: String,
}

// ---------------------------------------------------------------------------
// Export / import / publish
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Bundle file to import ("-" reads stdin)
    pub file: String,
    /// Only validate and report; don't write anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct PublishArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
    /// Publish every board, not just the current one
    #[arg(long)]
    pub all: bool,
    /// Page title (default: from config, then the board title)
    #[arg(long)]
    pub title: Option<String>,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Show entries after this timestamp (ISO-8601)
    #[arg(long)]
    pub since: Option<String>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove entries older than this many days (default: 30)
    #[arg(long, conflicts_with = "all")]
    pub days: Option<i64>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Turn column move mode on or off
    MoveMode(MoveModeArgs),
    /// Set the publish color of a tag
    TagColor(TagColorArgs),
}

#[derive(Args)]
pub struct MoveModeArgs {
    /// "on" or "off"
    pub state: String,
}

#[derive(Args)]
pub struct TagColorArgs {
    /// Tag, with or without the leading '#'
    pub tag: String,
    /// Color, e.g. "#d33"
    pub color: String,
}
