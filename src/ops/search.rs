use std::ops::Range;

use indexmap::IndexMap;
use regex::Regex;
use thiserror::Error;

use crate::model::{Board, Task, TaskLocation};
use crate::parse::normalize_tag;

/// Which part of the board matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Content,
    GroupTitle,
    ColumnTitle,
}

/// A search hit; `id` is the task, group or column that matched
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub column_id: String,
    pub field: MatchField,
    pub spans: Vec<Range<usize>>,
}

/// A task together with where it lives
#[derive(Debug, Clone)]
pub struct TaskRef<'a> {
    pub task: &'a Task,
    pub location: TaskLocation,
}

/// Collect all non-overlapping match byte-ranges for a regex in the given text.
fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Every task on the board in display order: per column, the direct list
/// first, then each group.
pub fn tasks_with_location(board: &Board) -> Vec<TaskRef<'_>> {
    let mut out = Vec::new();
    for column in &board.columns {
        for task in &column.tasks {
            out.push(TaskRef {
                task,
                location: TaskLocation::Direct {
                    column_id: column.id.clone(),
                },
            });
        }
        for group in &column.groups {
            for task in &group.tasks {
                out.push(TaskRef {
                    task,
                    location: TaskLocation::Grouped {
                        column_id: column.id.clone(),
                        group_id: group.id.clone(),
                    },
                });
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Tags in use on the board with the number of tasks carrying each, most used
/// first (ties keep first appearance order).
pub fn tag_counts(board: &Board) -> Vec<(String, usize)> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for task in board.all_tasks() {
        for tag in &task.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().map(|(t, n)| (t.to_string(), n)).collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Tasks carrying `tag` (leading `#` optional, case-insensitive)
pub fn tasks_with_tag<'a>(board: &'a Board, tag: &str) -> Vec<TaskRef<'a>> {
    let wanted = normalize_tag(tag);
    tasks_with_location(board)
        .into_iter()
        .filter(|r| r.task.tags.iter().any(|t| t.eq_ignore_ascii_case(wanted)))
        .collect()
}

// ---------------------------------------------------------------------------
// Regex search
// ---------------------------------------------------------------------------

/// Search task content, group titles and column titles
pub fn search_board(board: &Board, re: &Regex) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for column in &board.columns {
        let spans = find_matches(re, &column.title);
        if !spans.is_empty() {
            hits.push(SearchHit {
                id: column.id.clone(),
                column_id: column.id.clone(),
                field: MatchField::ColumnTitle,
                spans,
            });
        }
        for task in column.all_tasks() {
            let spans = find_matches(re, &task.content);
            if !spans.is_empty() {
                hits.push(SearchHit {
                    id: task.id.clone(),
                    column_id: column.id.clone(),
                    field: MatchField::Content,
                    spans,
                });
            }
        }
        for group in &column.groups {
            let spans = find_matches(re, &group.title);
            if !spans.is_empty() {
                hits.push(SearchHit {
                    id: group.id.clone(),
                    column_id: column.id.clone(),
                    field: MatchField::GroupTitle,
                    spans,
                });
            }
        }
    }
    hits
}

// ---------------------------------------------------------------------------
// ID resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no {kind} matches '{query}'")]
    NotFound { kind: &'static str, query: String },
    #[error("'{query}' matches {count} {kind}s; use more characters")]
    Ambiguous {
        kind: &'static str,
        query: String,
        count: usize,
    },
}

/// Pick the single ID that equals `query` or starts with it
fn resolve_prefix<'a>(
    kind: &'static str,
    query: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<String, ResolveError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ResolveError::NotFound {
            kind,
            query: query.to_string(),
        });
    }
    let mut matches: Vec<&str> = Vec::new();
    for id in ids {
        if id == query {
            return Ok(id.to_string());
        }
        if id.starts_with(query) {
            matches.push(id);
        }
    }
    match matches.as_slice() {
        [one] => Ok(one.to_string()),
        [] => Err(ResolveError::NotFound {
            kind,
            query: query.to_string(),
        }),
        many => Err(ResolveError::Ambiguous {
            kind,
            query: query.to_string(),
            count: many.len(),
        }),
    }
}

pub fn resolve_task(board: &Board, query: &str) -> Result<String, ResolveError> {
    resolve_prefix("task", query, board.all_tasks().map(|t| t.id.as_str()))
}

/// A column by exact title (ignoring case) or ID prefix
pub fn resolve_column(board: &Board, query: &str) -> Result<String, ResolveError> {
    if let Some(column) = board
        .columns
        .iter()
        .find(|c| c.title.eq_ignore_ascii_case(query.trim()))
    {
        return Ok(column.id.clone());
    }
    resolve_prefix("column", query, board.columns.iter().map(|c| c.id.as_str()))
}

/// A group by exact title (ignoring case) or ID prefix
pub fn resolve_group(board: &Board, query: &str) -> Result<String, ResolveError> {
    let groups = || board.columns.iter().flat_map(|c| c.groups.iter());
    if let Some(group) = groups().find(|g| g.title.eq_ignore_ascii_case(query.trim())) {
        return Ok(group.id.clone());
    }
    resolve_prefix("group", query, groups().map(|g| g.id.as_str()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
