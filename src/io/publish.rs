use std::collections::HashMap;

use serde::Serialize;

use crate::model::{AppConfig, Board, Column, Task};
use crate::parse::strip_tags;

/// Settings for one published page
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Document title; defaults to the board title (or "Boards" for several)
    pub title: Option<String>,
    pub include_completed: bool,
    pub tag_colors: HashMap<String, String>,
}

impl PublishOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        PublishOptions {
            title: config.publish.title.clone(),
            include_completed: config.publish.include_completed,
            tag_colors: config.ui.tag_colors.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageData<'a> {
    boards: Vec<PageBoard<'a>>,
    tag_colors: &'a HashMap<String, String>,
}

#[derive(Serialize)]
struct PageBoard<'a> {
    name: &'a str,
    title: &'a str,
    columns: Vec<PageColumn<'a>>,
}

#[derive(Serialize)]
struct PageColumn<'a> {
    id: &'a str,
    title: &'a str,
    color: Option<&'a str>,
    tasks: Vec<PageTask<'a>>,
    groups: Vec<PageGroup<'a>>,
}

#[derive(Serialize)]
struct PageGroup<'a> {
    title: &'a str,
    tasks: Vec<PageTask<'a>>,
}

/// A task as the page shows it: `text` is the content with tag markers
/// removed, the tags themselves are drawn as pills
#[derive(Serialize)]
struct PageTask<'a> {
    id: &'a str,
    content: &'a str,
    text: String,
    completed: bool,
    tags: &'a [String],
}

impl<'a> PageBoard<'a> {
    fn new(name: &'a str, board: &'a Board, include_completed: bool) -> Self {
        PageBoard {
            name,
            title: &board.title,
            columns: board
                .columns
                .iter()
                .map(|c| PageColumn::new(c, include_completed))
                .collect(),
        }
    }
}

impl<'a> PageColumn<'a> {
    fn new(column: &'a Column, include_completed: bool) -> Self {
        PageColumn {
            id: &column.id,
            title: &column.title,
            color: column.color.as_deref(),
            tasks: page_tasks(&column.tasks, include_completed),
            groups: column
                .groups
                .iter()
                .map(|g| PageGroup {
                    title: &g.title,
                    tasks: page_tasks(&g.tasks, include_completed),
                })
                .collect(),
        }
    }
}

fn page_tasks(tasks: &[Task], include_completed: bool) -> Vec<PageTask<'_>> {
    tasks
        .iter()
        .filter(|t| include_completed || !t.completed)
        .map(|t| PageTask {
            id: &t.id,
            content: &t.content,
            text: strip_tags(&t.content),
            completed: t.completed,
            tags: &t.tags,
        })
        .collect()
}

/// Render boards (name, board) as a self-contained HTML page
pub fn render_html(boards: &[(&str, &Board)], opts: &PublishOptions) -> Result<String, serde_json::Error> {
    let page_boards = boards
        .iter()
        .map(|&(name, board)| PageBoard::new(name, board, opts.include_completed))
        .collect();
    let data = PageData {
        boards: page_boards,
        tag_colors: &opts.tag_colors,
    };
    let json = script_safe(&serde_json::to_string(&data)?);

    let title = match (&opts.title, boards) {
        (Some(t), _) => t.clone(),
        (None, [(_, board)]) => board.title.clone(),
        (None, _) => "Boards".to_string(),
    };

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(&title)));
    out.push_str("<style>\n");
    out.push_str(STYLE);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape_html(&title)));
    out.push_str("<main id=\"boards\"></main>\n");
    out.push_str("<script id=\"board-data\" type=\"application/json\">");
    out.push_str(&json);
    out.push_str("</script>\n<script>\n");
    out.push_str(SCRIPT);
    out.push_str("</script>\n</body>\n</html>\n");
    Ok(out)
}

/// Keep embedded JSON from closing the script element early
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "<\\u0021--")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"body { font-family: system-ui, sans-serif; margin: 1.5rem; background: #f6f6f4; color: #222; }
h1 { font-size: 1.4rem; }
h2 { font-size: 1.1rem; margin-top: 2rem; }
.board { display: flex; gap: 1rem; align-items: flex-start; overflow-x: auto; }
.column { background: #fff; border-radius: 8px; min-width: 240px; max-width: 320px; padding: 0.75rem; border-top: 4px solid #ccc; }
.column h3 { margin: 0 0 0.5rem; font-size: 1rem; }
.column .count { color: #888; font-weight: normal; }
.group { border: 1px solid #e4e4e0; border-radius: 6px; padding: 0.5rem; margin-top: 0.5rem; }
.group h4 { margin: 0 0 0.25rem; font-size: 0.9rem; }
.task { background: #fafaf8; border-radius: 4px; padding: 0.4rem 0.5rem; margin: 0.3rem 0; white-space: pre-wrap; }
.task.done .text { text-decoration: line-through; color: #999; }
.pill { display: inline-block; font-size: 0.75rem; border-radius: 999px; padding: 0 0.5rem; margin: 0.2rem 0.2rem 0 0; background: #e0e0e0; color: #333; }
"#;

const SCRIPT: &str = r##"(function () {
  var data = JSON.parse(document.getElementById("board-data").textContent);
  var colors = data.tagColors || {};

  function el(tag, cls, text) {
    var node = document.createElement(tag);
    if (cls) node.className = cls;
    if (text !== undefined) node.textContent = text;
    return node;
  }

  function renderTask(task) {
    var node = el("div", task.completed ? "task done" : "task");
    node.appendChild(el("div", "text", task.text));
    (task.tags || []).forEach(function (tag) {
      var pill = el("span", "pill", "#" + tag);
      if (colors[tag]) {
        pill.style.background = colors[tag];
        pill.style.color = "#fff";
      }
      node.appendChild(pill);
    });
    return node;
  }

  function renderColumn(column) {
    var node = el("section", "column");
    if (column.color) node.style.borderTopColor = column.color;
    var count = column.tasks.length;
    column.groups.forEach(function (g) { count += g.tasks.length; });
    var heading = el("h3", null, column.title + " ");
    heading.appendChild(el("span", "count", "(" + count + ")"));
    node.appendChild(heading);
    column.tasks.forEach(function (t) { node.appendChild(renderTask(t)); });
    column.groups.forEach(function (group) {
      var g = el("div", "group");
      g.appendChild(el("h4", null, group.title));
      group.tasks.forEach(function (t) { g.appendChild(renderTask(t)); });
      node.appendChild(g);
    });
    return node;
  }

  var root = document.getElementById("boards");
  data.boards.forEach(function (entry) {
    if (data.boards.length > 1) root.appendChild(el("h2", null, entry.title));
    var board = el("div", "board");
    entry.columns.forEach(function (c) { board.appendChild(renderColumn(c)); });
    root.appendChild(board);
  });
})();
"##;
