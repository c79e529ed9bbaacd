use serde::Serialize;

use crate::model::{Board, Column, Group, Task, TaskLocation, Workspace, board_name, short_id};
use crate::ops::search::{MatchField, SearchHit, TaskRef};
use crate::ops::undo::UndoLedger;
use crate::util::unicode::{display_width, first_line_to_width, pad_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct BoardJson<'a> {
    pub name: &'a str,
    pub key: &'a str,
    pub current: bool,
    #[serde(flatten)]
    pub board: &'a Board,
}

#[derive(Serialize)]
pub struct BoardInfoJson<'a> {
    pub name: &'a str,
    pub key: &'a str,
    pub title: &'a str,
    pub current: bool,
    pub columns: usize,
    pub tasks: usize,
    pub completed: usize,
}

#[derive(Serialize)]
pub struct TagCountJson<'a> {
    pub tag: &'a str,
    pub count: usize,
}

#[derive(Serialize)]
pub struct TaskHitJson<'a> {
    pub id: &'a str,
    pub content: &'a str,
    pub completed: bool,
    pub tags: &'a [String],
    pub column: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<&'a str>,
}

#[derive(Serialize)]
pub struct SearchHitJson<'a> {
    pub board: &'a str,
    pub id: &'a str,
    pub column_id: &'a str,
    pub field: &'static str,
    pub text: &'a str,
}

#[derive(Serialize)]
pub struct UndoStatusJson {
    pub action: Option<String>,
    pub undo: usize,
    pub redo: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn board_infos(ws: &Workspace) -> Vec<BoardInfoJson<'_>> {
    ws.ordered_boards()
        .map(|(key, board)| BoardInfoJson {
            name: board_name(key),
            key,
            title: &board.title,
            current: key == ws.current,
            columns: board.columns.len(),
            tasks: board.card_count(),
            completed: board.completed_count(),
        })
        .collect()
}

fn field_name(field: MatchField) -> &'static str {
    match field {
        MatchField::Content => "content",
        MatchField::GroupTitle => "group_title",
        MatchField::ColumnTitle => "column_title",
    }
}

/// The text a search hit matched in
pub fn hit_text<'a>(board: &'a Board, hit: &SearchHit) -> &'a str {
    let Some(column) = board.column(&hit.column_id) else {
        return "";
    };
    match hit.field {
        MatchField::ColumnTitle => column.title.as_str(),
        MatchField::GroupTitle => column.group(&hit.id).map(|g| g.title.as_str()).unwrap_or(""),
        MatchField::Content => column
            .all_tasks()
            .find(|t| t.id == hit.id)
            .map(|t| t.content.as_str())
            .unwrap_or(""),
    }
}

pub fn search_hit_to_json<'a>(board_key: &'a str, board: &'a Board, hit: &'a SearchHit) -> SearchHitJson<'a> {
    SearchHitJson {
        board: board_name(board_key),
        id: &hit.id,
        column_id: &hit.column_id,
        field: field_name(hit.field),
        text: hit_text(board, hit),
    }
}

pub fn task_ref_to_json<'a>(board: &'a Board, r: &TaskRef<'a>) -> TaskHitJson<'a> {
    let (column, group) = location_titles(board, &r.location);
    TaskHitJson {
        id: &r.task.id,
        content: &r.task.content,
        completed: r.task.completed,
        tags: &r.task.tags,
        column,
        group,
    }
}

fn location_titles<'a>(board: &'a Board, location: &TaskLocation) -> (&'a str, Option<&'a str>) {
    let Some(column) = board.column(location.column_id()) else {
        return ("", None);
    };
    let group = location
        .group_id()
        .and_then(|gid| column.group(gid))
        .map(|g| g.title.as_str());
    (column.title.as_str(), group)
}

pub fn undo_status(ledger: &UndoLedger, action: Option<String>) -> UndoStatusJson {
    UndoStatusJson {
        action,
        undo: ledger.undo_len(),
        redo: ledger.redo_len(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// How much of each ID and task to print
#[derive(Debug, Clone, Copy)]
pub struct LineStyle {
    pub full_ids: bool,
    /// Maximum display width of task content
    pub width: usize,
}

impl LineStyle {
    fn id<'a>(&self, id: &'a str) -> &'a str {
        if self.full_ids { id } else { short_id(id) }
    }
}

fn check_char(completed: bool) -> char {
    if completed { 'x' } else { ' ' }
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task, style: LineStyle) -> String {
    format!(
        "[{}] {} {}",
        check_char(task.completed),
        style.id(&task.id),
        first_line_to_width(&task.content, style.width)
    )
}

pub fn format_group_header(group: &Group, style: LineStyle) -> String {
    let done = group.tasks.iter().filter(|t| t.completed).count();
    format!(
        "# {} [{}/{}] {}",
        group.title,
        done,
        group.tasks.len(),
        style.id(&group.id)
    )
}

pub fn format_column_header(column: &Column, style: LineStyle) -> String {
    let color = column
        .color
        .as_ref()
        .map(|c| format!(" {}", c))
        .unwrap_or_default();
    format!(
        "{} ({}) {}{}",
        column.title,
        column.card_count(),
        style.id(&column.id),
        color
    )
}

/// A whole board: columns in order, direct tasks first, then groups
pub fn format_board(board: &Board, style: LineStyle) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", board.title)];
    for column in &board.columns {
        lines.push(String::new());
        lines.push(format_column_header(column, style));
        for task in &column.tasks {
            lines.push(format!("  {}", format_task_line(task, style)));
        }
        for group in &column.groups {
            lines.push(format!("  {}", format_group_header(group, style)));
            for task in &group.tasks {
                lines.push(format!("    {}", format_task_line(task, style)));
            }
        }
    }
    lines
}

/// Board list, current board starred
pub fn format_board_list(ws: &Workspace) -> Vec<String> {
    let infos = board_infos(ws);
    let name_width = infos.iter().map(|i| display_width(i.name)).max().unwrap_or(0);
    infos
        .iter()
        .map(|info| {
            format!(
                "{} {}  {} columns, {}/{} done",
                if info.current { '*' } else { ' ' },
                pad_to_width(info.name, name_width),
                info.columns,
                info.completed,
                info.tasks
            )
        })
        .collect()
}

pub fn format_tag_counts(counts: &[(String, usize)]) -> Vec<String> {
    let width = counts.iter().map(|(t, _)| display_width(t) + 1).max().unwrap_or(0);
    counts
        .iter()
        .map(|(tag, count)| format!("{}  {}", pad_to_width(&format!("#{}", tag), width), count))
        .collect()
}

/// A task with where it lives, for filter output
pub fn format_task_ref(board: &Board, r: &TaskRef<'_>, style: LineStyle) -> String {
    let (column, group) = location_titles(board, &r.location);
    let place = match group {
        Some(g) => format!("{} / {}", column, g),
        None => column.to_string(),
    };
    format!("{}  ({})", format_task_line(r.task, style), place)
}

pub fn format_search_hit(board: &Board, hit: &SearchHit, style: LineStyle) -> String {
    let text = first_line_to_width(hit_text(board, hit), style.width);
    match hit.field {
        MatchField::Content => format!("{} {}", style.id(&hit.id), text),
        MatchField::GroupTitle => format!("{} group: {}", style.id(&hit.id), text),
        MatchField::ColumnTitle => format!("{} column: {}", style.id(&hit.id), text),
    }
}
