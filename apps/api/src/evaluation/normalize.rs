//! Text normalization applied to extracted CV text before prompting.

const ALLOWED_PUNCTUATION: &[char] = &['-', '.', ',', ';', ':', '@', '(', ')', '/', '+'];

fn is_allowed(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace() || ALLOWED_PUNCTUATION.contains(&c)
}

/// Replaces characters outside the whitelist with spaces, collapses every
/// whitespace run to one space and trims both ends.
///
/// Idempotent: `normalize_text(&normalize_text(x)) == normalize_text(x)`.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_whitespace() || !is_allowed(c) {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    out
}

/// The first `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
