use std::sync::LazyLock;

use regex::Regex;

/// `#word` at the start of the text or after whitespace. Word characters and
/// hyphens make up the tag name.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)#([\w-]+)").expect("tag pattern is valid"));

/// Extract tag names (without `#`) from content, deduplicated in order of
/// first appearance.
pub fn extract_tags(content: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for caps in TAG_RE.captures_iter(content) {
        let tag = &caps[2];
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Remove tag tokens from content, collapsing the whitespace left behind on
/// each line. Line breaks are kept.
pub fn strip_tags(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            let stripped = TAG_RE.replace_all(line, "$1");
            stripped.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize a user-supplied tag: strip a leading `#`, trim whitespace
pub fn normalize_tag(tag: &str) -> &str {
    tag.trim().trim_start_matches('#')
}
