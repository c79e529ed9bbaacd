/// A task's content split into a group title and member task lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingBlock {
    pub title: String,
    pub items: Vec<String>,
}

/// Intermediate split of a block: the heading, if the first line had one,
/// and the item lines. Without a heading every line is an item.
struct SplitBlock {
    heading: Option<String>,
    items: Vec<String>,
}

/// Parse content as a heading followed by list items.
///
/// Returns `None` unless the first non-empty line starts with a heading
/// marker (`#`, `##`, ...). Content without a heading is never turned into a
/// group, even though every line could be read as an item.
pub fn parse_heading_block(content: &str) -> Option<HeadingBlock> {
    let split = split_block(content);
    let title = split.heading?;
    Some(HeadingBlock {
        title,
        items: split.items,
    })
}

fn split_block(content: &str) -> SplitBlock {
    let mut lines = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    let first = match lines.next() {
        Some(l) => l,
        None => {
            return SplitBlock {
                heading: None,
                items: Vec::new(),
            };
        }
    };

    match strip_heading_marker(first) {
        Some(title) => SplitBlock {
            heading: Some(title.to_string()),
            items: lines.map(|l| strip_list_marker(l).to_string()).collect(),
        },
        None => SplitBlock {
            heading: None,
            items: std::iter::once(first)
                .chain(lines)
                .map(|l| strip_list_marker(l).to_string())
                .collect(),
        },
    }
}

/// `## Title` → `Title`. One or more `#` followed by an optional space.
fn strip_heading_marker(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches('#');
    if rest.len() == line.len() {
        return None;
    }
    Some(rest.strip_prefix(' ').unwrap_or(rest).trim())
}

/// `- item`, `* item`, `+ item` → `item`. The space after the marker is optional.
fn strip_list_marker(line: &str) -> &str {
    match line.strip_prefix(['-', '*', '+']) {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest).trim(),
        None => line,
    }
}
