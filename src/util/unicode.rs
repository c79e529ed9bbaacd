use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_display_width).sum()
}

/// Truncate a string to fit within `max_cells` terminal cells, appending `…` if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1; // reserve 1 cell for '…'
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = grapheme_display_width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result.push('\u{2026}');
    result
}

/// First line of `s`, truncated to `max_cells`. Content that continues on
/// further lines is marked with `…` even when the first line fits.
pub fn first_line_to_width(s: &str, max_cells: usize) -> String {
    let mut lines = s.lines();
    let first = lines.next().unwrap_or("");
    if lines.next().is_none() {
        return truncate_to_width(first, max_cells);
    }
    let truncated = truncate_to_width(first, max_cells.saturating_sub(1));
    if truncated.ends_with('\u{2026}') {
        truncated
    } else {
        format!("{}\u{2026}", truncated)
    }
}

/// Pad with spaces on the right so the result is `cells` wide. Strings that
/// are already wider are returned unchanged.
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let w = display_width(s);
    if w >= cells {
        return s.to_string();
    }
    format!("{}{}", s, " ".repeat(cells - w))
}

/// Display width of a grapheme cluster.
fn grapheme_display_width(g: &str) -> usize {
    if g == "\t" {
        return 4;
    }
    UnicodeWidthStr::width(g)
}
