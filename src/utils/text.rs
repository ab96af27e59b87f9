//! Plain-text helpers shared by post ingestion and the project loader.

/// Marker appended to truncated card text.
pub const ELLIPSIS: &str = "...";

/// Collapse every whitespace run (including newlines and nbsp) into one space
/// and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split(|c: char| c.is_whitespace() || c == '\u{a0}') {
        if word.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Number of characters (not bytes).
#[inline]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Cut `text` to at most `max_chars` characters, ellipsis included.
///
/// Text that already fits is returned unchanged.
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    if char_len(text) <= max_chars {
        return text.to_owned();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// File name without its last extension: `"cover.final.png"` → `"cover.final"`.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}
