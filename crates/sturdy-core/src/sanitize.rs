use once_cell::sync::Lazy;
use regex::Regex;

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Clean free text before it goes into a prompt.
///
/// Strips `<` and `>`, collapses runs of three or more newlines to two,
/// trims surrounding whitespace and truncates to `max_chars` characters.
/// `None` yields an empty string.
pub fn sanitize(input: Option<&str>, max_chars: usize) -> String {
    let Some(text) = input else {
        return String::new();
    };
    let stripped: String = text.chars().filter(|c| *c != '<' && *c != '>').collect();
    let normalized = stripped.replace("\r\n", "\n");
    let collapsed = EXCESS_NEWLINES.replace_all(&normalized, "\n\n");
    truncate_chars(collapsed.trim(), max_chars).to_string()
}

/// Cut `s` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
