mod init;
pub use init::cmd_init;

use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::board_io::{load_ledger, load_workspace, save_ledger, save_workspace};
use crate::io::bundle::{apply_import, export_bundle, parse_import};
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::publish::{PublishOptions, render_html};
use crate::io::recovery::{
    RecoveryCategory, RecoveryEntry, log_recovery, prune_recovery, read_recovery_entries,
    recovery_summary,
};
use crate::io::store::{FileStore, STORE_DIR, atomic_write};
use crate::model::{AppConfig, Board, TaskLocation, Workspace, board_key, board_name};
use crate::ops::command::{self, Command, Outcome};
use crate::ops::drag::{self, DragEnd, DragKind};
use crate::ops::undo::{UndoAction, UndoLedger};
use crate::ops::{board_ops, search, task_ops};
use crate::parse::normalize_tag;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let data_dir = config_io::resolve_data_dir(cli.data_dir.as_deref().map(Path::new))?;

    let cmd = match cli.command {
        // Init creates the data directory, so it runs before anything is opened
        Some(Commands::Init(args)) => return cmd_init(args, &data_dir),
        // Config edits only touch stackboard.toml
        Some(Commands::Config(args)) => return cmd_config(args, &data_dir),
        other => other,
    };

    let mut session = Session::open(&data_dir, json)?;
    match cmd {
        None => cmd_show(
            &session,
            ShowArgs {
                board: None,
                full_ids: false,
            },
        ),
        Some(cmd) => match cmd {
            Commands::Init(_) | Commands::Config(_) => Ok(()),

            // Read commands
            Commands::Show(args) => cmd_show(&session, args),
            Commands::Boards => cmd_boards(&session),
            Commands::Tags => cmd_tags(&session),
            Commands::Filter(args) => cmd_filter(&session, args),
            Commands::Search(args) => cmd_search(&session, args),
            Commands::Export(args) => cmd_export(&session, args),
            Commands::Publish(args) => cmd_publish(&session, args),

            // Write commands
            Commands::Board(args) => cmd_board(&mut session, args),
            Commands::Column(args) => cmd_column(&mut session, args),
            Commands::Group(args) => cmd_group(&mut session, args),
            Commands::Add(args) => cmd_add(&mut session, args),
            Commands::Edit(args) => cmd_edit(&mut session, args),
            Commands::Delete(args) => cmd_delete(&mut session, args),
            Commands::Toggle(args) => cmd_toggle(&mut session, args),
            Commands::Convert(args) => cmd_convert(&mut session, args),
            Commands::Mv(args) => cmd_mv(&mut session, args),
            Commands::Drag(args) => cmd_drag(&mut session, args),
            Commands::Undo => cmd_undo(&mut session),
            Commands::Redo => cmd_redo(&mut session),

            // Maintenance
            Commands::Import(args) => cmd_import(&mut session, args),
            Commands::Recovery(args) => cmd_recovery(&mut session, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Everything one invocation works with. The data directory stays locked
/// for the session's lifetime, since even loading may write (default board,
/// migrated boards, recovery entries).
struct Session {
    _lock: FileLock,
    json: bool,
    config: AppConfig,
    store: FileStore,
    ws: Workspace,
    ledger: UndoLedger,
}

impl Session {
    fn open(data_dir: &Path, json: bool) -> Result<Self, Box<dyn std::error::Error>> {
        fs::create_dir_all(data_dir)
            .map_err(|e| format!("cannot create data directory '{}': {}", data_dir.display(), e))?;
        let lock = FileLock::acquire_default(data_dir)?;
        let (config, _) = config_io::read_config(data_dir)?;
        let mut store = FileStore::open(&data_dir.join(STORE_DIR))?;
        let ws = load_workspace(&mut store, &config)?;
        let ledger = load_ledger(&mut store)?;
        Ok(Session {
            _lock: lock,
            json,
            config,
            store,
            ws,
            ledger,
        })
    }

    fn style(&self, full_ids: bool) -> LineStyle {
        LineStyle {
            full_ids,
            width: self.config.ui.content_width,
        }
    }

    fn current_key(&self) -> String {
        self.ws.current.clone()
    }

    fn current_board(&self) -> Result<&Board, Box<dyn std::error::Error>> {
        self.ws
            .current_board()
            .ok_or_else(|| "no current board (try `sb board switch <NAME>`)".into())
    }

    /// Run a command against the current board. The board is replaced only
    /// when the command changed something.
    fn apply(&mut self, cmd: &Command) -> Result<Outcome, Box<dyn std::error::Error>> {
        let key = self.current_key();
        let board = self
            .ws
            .boards
            .get_mut(&key)
            .ok_or("no current board (try `sb board switch <NAME>`)")?;
        let (next, outcome) = command::apply(board, cmd);
        if outcome.changed() {
            *board = next;
        }
        Ok(outcome)
    }

    /// Write the workspace and undo history back. A failed write is kept in
    /// the recovery log with the board that could not be saved.
    fn save(&mut self) -> CmdResult {
        let result = save_workspace(&mut self.store, &self.ws)
            .and_then(|()| save_ledger(&mut self.store, &self.ledger));
        if let Err(e) = result {
            let body = self
                .ws
                .current_board()
                .and_then(|b| serde_json::to_string_pretty(b).ok())
                .unwrap_or_default();
            log_recovery(
                &mut self.store,
                RecoveryEntry::new(RecoveryCategory::Write, "workspace could not be saved")
                    .field("Key", self.ws.current.clone())
                    .field("Error", e.to_string())
                    .body(body),
            );
            return Err(e.into());
        }
        Ok(())
    }

    fn resolve_task(&self, query: &str) -> Result<String, Box<dyn std::error::Error>> {
        Ok(search::resolve_task(self.current_board()?, query)?)
    }

    fn resolve_column(&self, query: &str) -> Result<String, Box<dyn std::error::Error>> {
        Ok(search::resolve_column(self.current_board()?, query)?)
    }

    fn resolve_group(&self, query: &str) -> Result<String, Box<dyn std::error::Error>> {
        Ok(search::resolve_group(self.current_board()?, query)?)
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Report a change: the affected ID in JSON mode, a short message otherwise
fn report(session: &Session, id: &str, message: String) -> CmdResult {
    if session.json {
        print_json(&serde_json::json!({ "id": id }))
    } else {
        println!("{}", message);
        Ok(())
    }
}

fn unchanged(what: &str) -> Box<dyn std::error::Error> {
    format!("{}: nothing changed", what).into()
}

/// Write to a file, or to stdout when no path is given
fn write_output(output: Option<&str>, content: &str) -> CmdResult {
    match output {
        Some(path) => {
            atomic_write(Path::new(path), content.as_bytes())
                .map_err(|e| format!("cannot write '{}': {}", path, e))?;
            eprintln!("wrote {}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_show(session: &Session, args: ShowArgs) -> CmdResult {
    let key = match &args.board {
        Some(name) => board_key(name),
        None => session.current_key(),
    };
    let board = session
        .ws
        .boards
        .get(&key)
        .ok_or_else(|| format!("board not found: {}", board_name(&key)))?;

    if session.json {
        return print_json(&BoardJson {
            name: board_name(&key),
            key: &key,
            current: key == session.ws.current,
            board,
        });
    }
    for line in format_board(board, session.style(args.full_ids)) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_boards(session: &Session) -> CmdResult {
    if session.json {
        return print_json(&board_infos(&session.ws));
    }
    for line in format_board_list(&session.ws) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_tags(session: &Session) -> CmdResult {
    let counts = search::tag_counts(session.current_board()?);
    if session.json {
        let out: Vec<TagCountJson> = counts
            .iter()
            .map(|(tag, count)| TagCountJson { tag, count: *count })
            .collect();
        return print_json(&out);
    }
    if counts.is_empty() {
        println!("no tags on this board");
    }
    for line in format_tag_counts(&counts) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_filter(session: &Session, args: FilterArgs) -> CmdResult {
    let board = session.current_board()?;
    let refs = search::tasks_with_tag(board, &args.tag);
    if session.json {
        let out: Vec<TaskHitJson> = refs.iter().map(|r| task_ref_to_json(board, r)).collect();
        return print_json(&out);
    }
    let style = session.style(false);
    for r in &refs {
        println!("{}", format_task_ref(board, r, style));
    }
    Ok(())
}

fn cmd_search(session: &Session, args: SearchArgs) -> CmdResult {
    let re = Regex::new(&args.pattern).map_err(|e| format!("invalid regex: {}", e))?;

    let boards: Vec<(&str, &Board)> = if args.all {
        session.ws.ordered_boards().collect()
    } else {
        vec![(session.ws.current.as_str(), session.current_board()?)]
    };

    let results: Vec<(&str, &Board, Vec<search::SearchHit>)> = boards
        .into_iter()
        .map(|(key, board)| (key, board, search::search_board(board, &re)))
        .collect();

    if session.json {
        let out: Vec<SearchHitJson> = results
            .iter()
            .flat_map(|(key, board, hits)| hits.iter().map(move |h| search_hit_to_json(key, board, h)))
            .collect();
        return print_json(&out);
    }

    let style = session.style(false);
    let mut any = false;
    for (key, board, hits) in &results {
        if hits.is_empty() {
            continue;
        }
        if args.all {
            println!("== {} ==", board_name(key));
        }
        for hit in hits {
            println!("{}", format_search_hit(board, hit, style));
        }
        any = true;
    }
    if !any {
        println!("no matches");
    }
    Ok(())
}

fn cmd_export(session: &Session, args: ExportArgs) -> CmdResult {
    let bundle = export_bundle(&session.ws);
    let mut text = serde_json::to_string_pretty(&bundle)?;
    text.push('\n');
    write_output(args.output.as_deref(), &text)
}

fn cmd_publish(session: &Session, args: PublishArgs) -> CmdResult {
    let mut opts = PublishOptions::from_config(&session.config);
    if args.title.is_some() {
        opts.title = args.title;
    }
    let boards: Vec<(&str, &Board)> = if args.all {
        session
            .ws
            .ordered_boards()
            .map(|(key, board)| (board_name(key), board))
            .collect()
    } else {
        vec![(board_name(&session.ws.current), session.current_board()?)]
    };
    let html = render_html(&boards, &opts)?;
    write_output(args.output.as_deref(), &html)
}

// ---------------------------------------------------------------------------
// Board management
// ---------------------------------------------------------------------------

fn cmd_board(session: &mut Session, args: BoardCmd) -> CmdResult {
    match args.action {
        BoardAction::New(a) => {
            let board = Board::with_columns(a.name.clone(), &session.config.board.default_columns);
            let key = board_ops::create_board(&mut session.ws, &a.name, board)?;
            session.save()?;
            report(session, &key, format!("created board '{}'", a.name))
        }
        BoardAction::Rename(a) => {
            let key = board_ops::rename_board(&mut session.ws, &a.name, &a.new_name)?;
            // The title follows the name unless it was set to something else
            if let Some(board) = session.ws.boards.get_mut(&key)
                && board.title == a.name
            {
                command::apply_in_place(
                    board,
                    &Command::RenameBoard {
                        title: a.new_name.clone(),
                    },
                );
            }
            session.save()?;
            report(session, &key, format!("renamed board '{}' to '{}'", a.name, a.new_name))
        }
        BoardAction::Delete(a) => {
            let removed = board_ops::delete_board(&mut session.ws, &a.name)?;
            let key = removed.key.clone();
            session.ledger.record(UndoAction::DeleteBoard {
                board_key: removed.key,
                content: removed.content,
                index: removed.index,
            });
            session.save()?;
            report(session, &key, format!("deleted board '{}' (undo with `sb undo`)", a.name))
        }
        BoardAction::Switch(a) => {
            board_ops::switch_board(&mut session.ws, &a.name)?;
            session.save()?;
            report(session, &board_key(&a.name), format!("switched to board '{}'", a.name))
        }
        BoardAction::Mv(a) => {
            let key = board_key(&a.name);
            let from = session
                .ws
                .board_order
                .iter()
                .position(|k| *k == key)
                .ok_or_else(|| format!("board not found: {}", a.name))?;
            if !board_ops::reorder_boards(&mut session.ws, from, a.position) {
                return Err(format!(
                    "position {} out of range (0..{})",
                    a.position,
                    session.ws.board_order.len()
                )
                .into());
            }
            session.save()?;
            report(session, &key, format!("moved board '{}' to position {}", a.name, a.position))
        }
    }
}

// ---------------------------------------------------------------------------
// Column and group management
// ---------------------------------------------------------------------------

fn cmd_column(session: &mut Session, args: ColumnCmd) -> CmdResult {
    match args.action {
        ColumnAction::Add(a) => {
            let outcome = session.apply(&Command::CreateColumn {
                title: a.title.clone(),
            })?;
            let Outcome::Created { id } = outcome else {
                return Err(unchanged("column add"));
            };
            session.save()?;
            report(session, &id, id.clone())
        }
        ColumnAction::Rename(a) => {
            let column_id = session.resolve_column(&a.column)?;
            let outcome = session.apply(&Command::RenameColumn {
                column_id: column_id.clone(),
                title: a.title.clone(),
            })?;
            if !outcome.changed() {
                return Err(unchanged("column rename"));
            }
            session.save()?;
            report(session, &column_id, format!("renamed column to '{}'", a.title))
        }
        ColumnAction::Delete(a) => {
            let column_id = session.resolve_column(&a.column)?;
            let outcome = session.apply(&Command::DeleteColumn {
                column_id: column_id.clone(),
            })?;
            let Outcome::ColumnRemoved { column, index } = outcome else {
                return Err(unchanged("column delete"));
            };
            let title = column.title.clone();
            let board_key = session.current_key();
            session.ledger.record(UndoAction::DeleteColumn {
                board_key,
                column,
                index,
            });
            session.save()?;
            report(session, &column_id, format!("deleted column '{}' (undo with `sb undo`)", title))
        }
        ColumnAction::Mv(a) => {
            let column_id = session.resolve_column(&a.column)?;
            let from = session
                .current_board()?
                .column_index(&column_id)
                .ok_or_else(|| format!("column not found: {}", a.column))?;
            let outcome = session.apply(&Command::ReorderColumns {
                from,
                to: a.position,
            })?;
            if !outcome.changed() {
                return Err(format!("position {} out of range", a.position).into());
            }
            session.save()?;
            report(session, &column_id, format!("moved column to position {}", a.position))
        }
        ColumnAction::Color(a) => {
            if a.color.is_none() && !a.clear {
                return Err("give a color or --clear".into());
            }
            let column_id = session.resolve_column(&a.column)?;
            session.apply(&Command::SetColumnColor {
                column_id: column_id.clone(),
                color: a.color.clone(),
            })?;
            session.save()?;
            let message = match &a.color {
                Some(c) => format!("column color set to {}", c),
                None => "column color cleared".to_string(),
            };
            report(session, &column_id, message)
        }
    }
}

fn cmd_group(session: &mut Session, args: GroupCmd) -> CmdResult {
    match args.action {
        GroupAction::Add(a) => {
            let column_id = session.resolve_column(&a.column)?;
            let outcome = session.apply(&Command::CreateGroup {
                column_id,
                title: a.title.clone(),
            })?;
            let Outcome::Created { id } = outcome else {
                return Err(unchanged("group add"));
            };
            session.save()?;
            report(session, &id, id.clone())
        }
        GroupAction::Rename(a) => {
            let group_id = session.resolve_group(&a.group)?;
            let outcome = session.apply(&Command::RenameGroup {
                group_id: group_id.clone(),
                title: a.title.clone(),
            })?;
            if !outcome.changed() {
                return Err(unchanged("group rename"));
            }
            session.save()?;
            report(session, &group_id, format!("renamed group to '{}'", a.title))
        }
        GroupAction::Delete(a) => {
            let group_id = session.resolve_group(&a.group)?;
            let outcome = session.apply(&Command::DeleteGroup {
                group_id: group_id.clone(),
            })?;
            let Outcome::GroupRemoved(group) = outcome else {
                return Err(unchanged("group delete"));
            };
            session.save()?;
            report(
                session,
                &group_id,
                format!("deleted group '{}' and {} task(s)", group.title, group.tasks.len()),
            )
        }
        GroupAction::Toggle(a) => {
            let group_id = session.resolve_group(&a.group)?;
            let outcome = session.apply(&Command::ToggleGroupCompleted {
                group_id: group_id.clone(),
            })?;
            if !outcome.changed() {
                return Err(unchanged("group toggle"));
            }
            session.save()?;
            let done = session
                .current_board()?
                .group(&group_id)
                .map(|(_, g)| g.all_completed())
                .unwrap_or(false);
            report(
                session,
                &group_id,
                format!("group marked {}", if done { "done" } else { "not done" }),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_add(session: &mut Session, args: AddArgs) -> CmdResult {
    let column_id = session.resolve_column(&args.column)?;
    let outcome = session.apply(&Command::CreateTask { column_id })?;
    let Outcome::Created { id } = outcome else {
        return Err(unchanged("add"));
    };
    if let Some(content) = args.content {
        session.apply(&Command::UpdateTaskContent {
            task_id: id.clone(),
            content,
        })?;
    }
    session.save()?;
    report(session, &id, id.clone())
}

fn cmd_edit(session: &mut Session, args: EditArgs) -> CmdResult {
    let task_id = session.resolve_task(&args.id)?;
    session.apply(&Command::UpdateTaskContent {
        task_id: task_id.clone(),
        content: args.content,
    })?;
    session.save()?;
    report(session, &task_id, format!("updated {}", task_id))
}

fn cmd_delete(session: &mut Session, args: TaskIdArg) -> CmdResult {
    let task_id = session.resolve_task(&args.id)?;
    let outcome = session.apply(&Command::DeleteTask {
        task_id: task_id.clone(),
    })?;
    let Outcome::TaskRemoved(removed) = outcome else {
        return Err(unchanged("delete"));
    };
    let board_key = session.current_key();
    session.ledger.record(UndoAction::DeleteTask {
        board_key,
        task: removed.task,
        location: removed.location,
        index: removed.index,
    });
    session.save()?;
    report(session, &task_id, format!("deleted {} (undo with `sb undo`)", task_id))
}

fn cmd_toggle(session: &mut Session, args: TaskIdArg) -> CmdResult {
    let task_id = session.resolve_task(&args.id)?;
    session.apply(&Command::ToggleTaskCompleted {
        task_id: task_id.clone(),
    })?;
    session.save()?;
    let done = task_ops::find_task(session.current_board()?, &task_id)
        .map(|t| t.completed)
        .unwrap_or(false);
    report(
        session,
        &task_id,
        format!("{} {}", task_id, if done { "done" } else { "not done" }),
    )
}

fn cmd_convert(session: &mut Session, args: TaskIdArg) -> CmdResult {
    let task_id = session.resolve_task(&args.id)?;
    let content = task_ops::find_task(session.current_board()?, &task_id)
        .map(|t| t.content.clone())
        .ok_or_else(|| format!("task not found: {}", args.id))?;
    let outcome = session.apply(&Command::ConvertTaskToGroup { task_id, content })?;
    let Outcome::Created { id } = outcome else {
        return Err("task content does not start with a heading (e.g. \"# Title\")".into());
    };
    session.save()?;
    report(session, &id, id.clone())
}

fn cmd_mv(session: &mut Session, args: MvArgs) -> CmdResult {
    let task_id = session.resolve_task(&args.id)?;
    let board = session.current_board()?;
    let from = task_ops::locate_task(board, &task_id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;

    let to = match (&args.group, &args.column) {
        (Some(group), _) => {
            let group_id = search::resolve_group(board, group)?;
            let (column_id, _) = board
                .group(&group_id)
                .ok_or_else(|| format!("group not found: {}", group))?;
            TaskLocation::Grouped {
                column_id: column_id.to_string(),
                group_id,
            }
        }
        (None, Some(column)) => TaskLocation::Direct {
            column_id: search::resolve_column(board, column)?,
        },
        (None, None) => return Err("give --column or --group".into()),
    };
    let to_index = args
        .index
        .unwrap_or_else(|| board.container(&to).map(|t| t.len()).unwrap_or(0));

    let outcome = session.apply(&Command::MoveTask {
        task_id: task_id.clone(),
        from,
        to,
        to_index,
    })?;
    if !outcome.changed() {
        return Err(unchanged("mv"));
    }
    session.save()?;
    report(session, &task_id, format!("moved {}", task_id))
}

fn cmd_drag(session: &mut Session, args: DragArgs) -> CmdResult {
    let active_kind: DragKind = args.active_kind.parse()?;
    let over_kind: DragKind = args.over_kind.parse()?;
    let board = session.current_board()?;

    let resolve = |kind: DragKind, query: &str| -> Result<String, search::ResolveError> {
        match kind {
            DragKind::Task => search::resolve_task(board, query),
            DragKind::Column | DragKind::ColumnArea => search::resolve_column(board, query),
            DragKind::Group => search::resolve_group(board, query),
        }
    };
    let active_id = resolve(active_kind, args.active_id.as_str())?;
    let over_id = resolve(over_kind, args.over_id.as_str())?;

    let gesture = DragEnd::new(&active_id, active_kind, &over_id, over_kind);
    let column_move_mode = args.column_move || session.config.drag.column_move_mode;
    let (next, cmd, outcome) = drag::resolve_and_apply(board, &gesture, column_move_mode);

    if outcome.changed() {
        let key = session.current_key();
        session.ws.boards.insert(key, next);
        session.save()?;
    }

    if session.json {
        return print_json(&serde_json::json!({
            "command": cmd,
            "changed": outcome.changed(),
        }));
    }
    match cmd {
        Some(_) if outcome.changed() => {
            println!("{} {} dropped on {} {}", active_kind, active_id, over_kind, over_id)
        }
        _ if active_kind == DragKind::Column && !column_move_mode => {
            println!("column move mode is off (use --column-move or `sb config move-mode on`)")
        }
        _ => println!("nothing to do"),
    }
    Ok(())
}

fn cmd_undo(session: &mut Session) -> CmdResult {
    let action = session.ledger.undo(&mut session.ws)?.map(|a| a.to_string());
    if action.is_some() {
        session.save()?;
    }
    if session.json {
        return print_json(&undo_status(&session.ledger, action));
    }
    match action {
        Some(a) => println!("undid: {}", a),
        None => println!("nothing to undo"),
    }
    Ok(())
}

fn cmd_redo(session: &mut Session) -> CmdResult {
    let action = session.ledger.redo(&mut session.ws)?.map(|a| a.to_string());
    if action.is_some() {
        session.save()?;
    }
    if session.json {
        return print_json(&undo_status(&session.ledger, action));
    }
    match action {
        Some(a) => println!("redid: {}", a),
        None => println!("nothing to redo"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

fn cmd_import(session: &mut Session, args: ImportArgs) -> CmdResult {
    let text = if args.file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&args.file).map_err(|e| format!("cannot read '{}': {}", args.file, e))?
    };

    let imported = parse_import(&text)?;
    for warning in &imported.warnings {
        eprintln!("warning: {}", warning);
    }

    if !args.dry_run {
        apply_import(&mut session.store, &imported)?;
        // The store now holds the imported set; keep the in-memory copy in step
        session.ws = imported.to_workspace();
        session.ledger = UndoLedger::new();
    }

    if session.json {
        return print_json(&serde_json::json!({
            "boards": imported.board_order.iter().map(|k| board_name(k)).collect::<Vec<_>>(),
            "warnings": imported.warnings,
            "dryRun": args.dry_run,
        }));
    }
    let verb = if args.dry_run { "would import" } else { "imported" };
    println!("{} {} board(s):", verb, imported.boards.len());
    for key in &imported.board_order {
        println!("  {}", board_name(key));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

fn cmd_recovery(session: &mut Session, args: RecoveryCmd) -> CmdResult {
    if let Some(RecoveryAction::Prune(prune)) = args.action {
        let before = prune.days.map(|d| Utc::now() - Duration::days(d));
        let removed = prune_recovery(&mut session.store, before, prune.all)?;
        if session.json {
            return print_json(&serde_json::json!({ "removed": removed }));
        }
        println!("pruned {} entr{}", removed, if removed == 1 { "y" } else { "ies" });
        return Ok(());
    }

    let since = match &args.since {
        Some(s) => Some(
            DateTime::parse_from_rfc3339(s)
                .map_err(|e| format!("invalid --since timestamp '{}': {}", s, e))?
                .with_timezone(&Utc),
        ),
        None => None,
    };
    let entries = read_recovery_entries(&session.store, Some(args.limit.unwrap_or(10)), since);

    if session.json {
        return print_json(&entries);
    }
    let Some(summary) = recovery_summary(&session.store) else {
        println!("recovery log is empty");
        return Ok(());
    };
    let since_text = summary
        .oldest
        .map(|t| format!(" since {}", t.format("%Y-%m-%d")))
        .unwrap_or_default();
    println!(
        "{} entr{}{}, showing {}\n",
        summary.entry_count,
        if summary.entry_count == 1 { "y" } else { "ies" },
        since_text,
        entries.len()
    );
    for entry in &entries {
        print!("{}", entry.to_display_markdown());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(args: ConfigCmd, data_dir: &Path) -> CmdResult {
    fs::create_dir_all(data_dir)?;
    let _lock = FileLock::acquire_default(data_dir)?;
    let (_, mut doc) = config_io::read_config(data_dir)?;

    let message = match args.action {
        ConfigAction::MoveMode(a) => {
            let on = match a.state.to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" => true,
                "off" | "false" | "no" => false,
                other => return Err(format!("expected 'on' or 'off', got '{}'", other).into()),
            };
            config_io::set_column_move_mode(&mut doc, on);
            format!("column move mode {}", if on { "on" } else { "off" })
        }
        ConfigAction::TagColor(a) => {
            let tag = normalize_tag(&a.tag);
            if tag.is_empty() {
                return Err("tag cannot be empty".into());
            }
            config_io::set_tag_color(&mut doc, tag, &a.color);
            format!("#{} will publish as {}", tag, a.color)
        }
    };
    config_io::write_config(data_dir, &doc)?;
    println!("{}", message);
    Ok(())
}
