use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_VALIDATION: &str =
    "This is a hard moment, and the fact that you're looking for the right words shows how much you care.";
pub const DEFAULT_SHIFT: &str =
    "Your child isn't giving you a hard time; they're having a hard time, and their behavior is telling you what they need.";
pub const DEFAULT_SCRIPT: &str = "\u{201c}I'm right here. You're safe. We'll figure this out together.\u{201d}";

// Leading list markers, markdown bold/headings and numbering are tolerated
// before a label, and bold markers around the separator.
static VALIDATION: Lazy<Regex> = Lazy::new(|| label_regex("validation"));
static SHIFT: Lazy<Regex> = Lazy::new(|| label_regex("(?:shift|reframe)"));
static SCRIPT: Lazy<Regex> = Lazy::new(|| label_regex("script"));
static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new("\"[^\"\\n]+\"|\u{201c}[^\u{201d}\\n]+\u{201d}").unwrap());
// Any label mid-line; a dash separator must be followed by a space.
static INLINE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(validation|shift|reframe|script)\b[ \t]*\**[ \t]*(?::|-[ \t])\**").unwrap()
});

fn label_regex(label: &str) -> Regex {
    Regex::new(&format!(
        r"(?im)^[ \t>*#•\-\d.)]*{label}[ \t]*\**[ \t]*[:\-]\**[ \t]*(.+)$"
    ))
    .unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Validation,
    Shift,
    Script,
}

impl Field {
    fn of_label(label: &str) -> Field {
        match label.to_ascii_lowercase().as_str() {
            "validation" => Field::Validation,
            "script" => Field::Script,
            _ => Field::Shift,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScript {
    pub validation: String,
    pub shift: String,
    pub script: String,
}

/// Extract the three parts from free-form model output.
///
/// Each field is resolved on its own: labeled line, label inside a line,
/// then position among the non-empty lines, then a fixed default. Never fails.
pub fn parse_model_output(raw: &str) -> ParsedScript {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let validation = labeled(&VALIDATION, raw, non_blank)
        .or_else(|| inline(raw, Field::Validation, non_blank))
        .or_else(|| positional(&lines, 0).and_then(non_blank))
        .unwrap_or_else(|| DEFAULT_VALIDATION.to_string());

    let shift = labeled(&SHIFT, raw, non_blank)
        .or_else(|| inline(raw, Field::Shift, non_blank))
        .or_else(|| positional(&lines, 1).and_then(non_blank))
        .unwrap_or_else(|| DEFAULT_SHIFT.to_string());

    let script = labeled(&SCRIPT, raw, usable_script)
        .or_else(|| inline(raw, Field::Script, usable_script))
        .or_else(|| first_quoted(raw))
        .or_else(|| positional(&lines, 2).and_then(usable_script))
        .unwrap_or_else(|| DEFAULT_SCRIPT.to_string());

    ParsedScript {
        validation,
        shift,
        script,
    }
}

fn labeled(re: &Regex, raw: &str, accept: fn(String) -> Option<String>) -> Option<String> {
    re.captures_iter(raw)
        .filter_map(|c| c.get(1))
        .find_map(|m| accept(clean(m.as_str())))
}

/// Labels that do not start a line. A value runs until the next label on the
/// same line or the end of the line.
fn inline(raw: &str, field: Field, accept: fn(String) -> Option<String>) -> Option<String> {
    raw.lines().find_map(|line| {
        let marks: Vec<_> = INLINE_LABEL.captures_iter(line).collect();
        marks.iter().enumerate().find_map(|(i, caps)| {
            let label = caps.get(1)?;
            if Field::of_label(label.as_str()) != field {
                return None;
            }
            let start = caps.get(0)?.end();
            let end = marks
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(line.len(), |m| m.start());
            accept(clean(&line[start..end]))
        })
    })
}

fn positional(lines: &[&str], idx: usize) -> Option<String> {
    lines.get(idx).map(|l| clean(l))
}

fn first_quoted(raw: &str) -> Option<String> {
    QUOTED
        .find_iter(raw)
        .map(|m| m.as_str())
        .find(|q| quoted_inner(q).is_some_and(|inner| !inner.trim().is_empty()))
        .map(str::to_string)
}

/// Trim whitespace and stray trailing bold markers.
fn clean(s: &str) -> String {
    s.trim().trim_end_matches("**").trim().to_string()
}

fn non_blank(s: String) -> Option<String> {
    Some(s).filter(|s| !s.is_empty())
}

/// The text between a matching `"…"` or `“…”` pair.
fn quoted_inner(s: &str) -> Option<&str> {
    [('"', '"'), ('\u{201c}', '\u{201d}')]
        .into_iter()
        .find_map(|(open, close)| {
            let inner = s.strip_prefix(open)?.strip_suffix(close)?;
            Some(inner)
        })
}

/// Normalize a candidate script, or reject it when nothing sayable is left.
///
/// A delimited quote is kept as-is, a quote followed by stage directions is
/// cut down to the quote, and bare text is wrapped in curly quotes.
fn usable_script(s: String) -> Option<String> {
    let trimmed = s.trim();
    if let Some(inner) = quoted_inner(trimmed) {
        return (!inner.trim().is_empty()).then(|| trimmed.to_string());
    }
    if let Some(quote) = first_quoted(trimmed) {
        return Some(quote);
    }
    let bare = trimmed.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '"' | '\u{201c}' | '\u{201d}')
    });
    if bare.is_empty() {
        None
    } else {
        Some(format!("\u{201c}{bare}\u{201d}"))
    }
}

/// Wrap in curly quotes unless the text is already quote-delimited.
/// Text with nothing inside the quotes becomes the default script.
pub fn ensure_quoted(s: &str) -> String {
    usable_script(s.to_string()).unwrap_or_else(|| DEFAULT_SCRIPT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_quoted(s: &str) {
        let inner = quoted_inner(s).unwrap_or_else(|| panic!("not quote-wrapped: {s:?}"));
        assert!(!inner.trim().is_empty(), "empty inside quotes: {s:?}");
    }

    #[test]
    fn labeled_output() {
        let raw = "Validation: You're doing great.\nShift: Kids act out.\nScript: \"Let's breathe.\"";
        let parsed = parse_model_output(raw);
        assert_eq!(parsed.validation, "You're doing great.");
        assert_eq!(parsed.shift, "Kids act out.");
        assert_eq!(parsed.script, "\"Let's breathe.\"");
    }

    #[test]
    fn labels_are_case_insensitive_with_dash_separator() {
        let raw = "VALIDATION - That sounds exhausting.\nreframe - He is scared.\nscript - I'm here.";
        let parsed = parse_model_output(raw);
        assert_eq!(parsed.validation, "That sounds exhausting.");
        assert_eq!(parsed.shift, "He is scared.");
        assert_eq!(parsed.script, "\u{201c}I'm here.\u{201d}");
    }

    #[test]
    fn markdown_decorated_labels() {
        let raw = "Sure! Here you go:\n\n1. **Validation:** You are not alone.\n2. **Shift:** Tired bodies melt down.\n3. **Script:** \u{201c}Let's rest first.\u{201d}";
        let parsed = parse_model_output(raw);
        assert_eq!(parsed.validation, "You are not alone.");
        assert_eq!(parsed.shift, "Tired bodies melt down.");
        assert_eq!(parsed.script, "\u{201c}Let's rest first.\u{201d}");
    }

    #[test]
    fn labels_in_the_middle_of_a_line() {
        let parsed = parse_model_output("Here you go. Validation: a. Shift: b. Script: c");
        assert_eq!(parsed.validation, "a.");
        assert_eq!(parsed.shift, "b.");
        assert_eq!(parsed.script, "\u{201c}c\u{201d}");

        let mixed = parse_model_output(
            "Validation: You're tired.\nOkay. Reframe - she wants control. Script: \"You pick the shirt.\"",
        );
        assert_eq!(mixed.validation, "You're tired.");
        assert_eq!(mixed.shift, "she wants control.");
        assert_eq!(mixed.script, "\"You pick the shirt.\"");
    }

    #[test]
    fn inline_labels_need_a_word_boundary() {
        let parsed = parse_model_output("Transcript: nothing here");
        assert_eq!(parsed.validation, "Transcript: nothing here");
        assert_eq!(parsed.script, DEFAULT_SCRIPT);
    }

    #[test]
    fn unlabeled_lines_fall_back_to_position() {
        let raw = "first thought\n\nsecond thought\nthird thought\nfourth";
        let parsed = parse_model_output(raw);
        assert_eq!(parsed.validation, "first thought");
        assert_eq!(parsed.shift, "second thought");
        assert_eq!(parsed.script, "\u{201c}third thought\u{201d}");
    }

    #[test]
    fn quoted_substring_beats_position() {
        let raw = "That is hard.\nShe needs you.\nTry saying \u{201c}I see you're upset.\u{201d} softly.";
        let parsed = parse_model_output(raw);
        assert_eq!(parsed.script, "\u{201c}I see you're upset.\u{201d}");

        let straight = "a\nb\nMaybe: \"You can be mad and I'll keep you safe.\"";
        assert_eq!(
            parse_model_output(straight).script,
            "\"You can be mad and I'll keep you safe.\""
        );
    }

    #[test]
    fn quoted_label_value_with_trailing_text_keeps_only_the_quote() {
        let parsed = parse_model_output("Script: \"Let's breathe.\" Then hug.");
        assert_eq!(parsed.script, "\"Let's breathe.\"");
    }

    #[test]
    fn empty_quoted_label_falls_through() {
        let parsed = parse_model_output("Script: \"\"\nLater: \u{201c}Breathe with me.\u{201d}");
        assert_eq!(parsed.script, "\u{201c}Breathe with me.\u{201d}");

        for raw in ["Script: \"\"", "Script: \u{201c}\u{201d}", "Script: \"   \""] {
            assert_eq!(parse_model_output(raw).script, DEFAULT_SCRIPT, "{raw:?}");
        }
    }

    #[test]
    fn empty_output_uses_defaults() {
        let parsed = parse_model_output("");
        assert_eq!(parsed.validation, DEFAULT_VALIDATION);
        assert_eq!(parsed.shift, DEFAULT_SHIFT);
        assert_eq!(parsed.script, DEFAULT_SCRIPT);
        assert_quoted(&parsed.script);
    }

    #[test]
    fn partial_output_mixes_labels_and_defaults() {
        let parsed = parse_model_output("Validation: Hard day.");
        assert_eq!(parsed.validation, "Hard day.");
        assert_eq!(parsed.shift, DEFAULT_SHIFT);
        assert_eq!(parsed.script, DEFAULT_SCRIPT);
    }

    #[test]
    fn empty_label_value_is_skipped() {
        let raw = "Validation:\nValidation: Second try.";
        assert_eq!(parse_model_output(raw).validation, "Second try.");
    }

    #[test]
    fn script_is_always_wrapped() {
        let samples = [
            "",
            "   \n\n  ",
            "one",
            "one\ntwo\nthree",
            "Script: \"",
            "Script: \"\"",
            "Script: \u{201c}\u{201d}",
            "Script: \"   \"",
            "Script: plain words",
            "\u{201c}only curly\u{201d}",
            "<<<>>>\n\"\"\n''",
            "a\nb\n\"  \"",
            "Validation: a\nShift: b\nScript: \u{201c}c\u{201d}",
        ];
        for raw in samples {
            assert_quoted(&parse_model_output(raw).script);
        }
    }

    #[test]
    fn ensure_quoted_behaviour() {
        assert_eq!(ensure_quoted("hi"), "\u{201c}hi\u{201d}");
        assert_eq!(ensure_quoted("\"hi\""), "\"hi\"");
        assert_eq!(ensure_quoted("\u{201c}hi\u{201d}"), "\u{201c}hi\u{201d}");
        assert_eq!(ensure_quoted("  "), DEFAULT_SCRIPT);
        assert_eq!(ensure_quoted("\""), DEFAULT_SCRIPT);
        assert_eq!(ensure_quoted("\"\""), DEFAULT_SCRIPT);
    }

    #[test]
    fn mismatched_quote_pairs_are_rewrapped() {
        assert_eq!(
            ensure_quoted("\u{201d}backwards\u{201c}"),
            "\u{201c}backwards\u{201d}"
        );
        assert_eq!(ensure_quoted("\"half\u{201d}"), "\u{201c}half\u{201d}");
    }
}
