//! Post-processing: deterministic cleanup of the LLM-generated report.
//!
//! The report is drawn with a PDF built-in font, which has no Markdown
//! rendering and only covers Latin-1. Models still answer with `**bold**`,
//! `## headings`, smart quotes and the occasional code fence even when told
//! to write plain text, so these rules turn the answer into something the
//! renderer can print faithfully.
//!
//! ## Rule Order
//!
//! Fences are stripped before line endings are normalised so the fence regex
//! sees the raw answer; typography is mapped to ASCII before the Latin-1
//! filter so dashes and quotes survive as their ASCII forms.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all post-processing rules to the raw report text.
///
/// Rules (applied in order):
/// 1. Strip outer code fences
/// 2. Normalise line endings (CRLF → LF)
/// 3. Trim trailing whitespace per line
/// 4. Drop Markdown heading markers
/// 5. Drop Markdown emphasis markers
/// 6. Normalise bullet glyphs to `- `
/// 7. Map typographic punctuation to ASCII
/// 8. Strip invisible Unicode
/// 9. Replace characters the built-in font cannot draw
/// 10. Collapse runs of blank lines to one
/// 11. Ensure the text ends with exactly one newline
pub fn clean_report(input: &str) -> String {
    let s = strip_fences(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = strip_heading_markers(&s);
    let s = strip_emphasis(&s);
    let s = normalise_bullets(&s);
    let s = map_typography(&s);
    let s = remove_invisible_chars(&s);
    let s = replace_unprintable(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Strip outer fences ───────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(?:text|plaintext|markdown|md)?\r?\n(.*)\r?\n```\s*$").unwrap()
});

fn strip_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Heading markers ──────────────────────────────────────────────────

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+").unwrap());

fn strip_heading_markers(input: &str) -> String {
    RE_HEADING.replace_all(input, "").to_string()
}

// ── Rule 5: Emphasis markers ─────────────────────────────────────────────────

static RE_STRONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\*\*|__)([^\n]+?)(\*\*|__)").unwrap());

fn strip_emphasis(input: &str) -> String {
    RE_STRONG.replace_all(input, "$2").to_string()
}

// ── Rule 6: Bullets ──────────────────────────────────────────────────────────

static RE_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)[•◦▪‣*][ \t]+").unwrap());

fn normalise_bullets(input: &str) -> String {
    RE_BULLET.replace_all(input, "${1}- ").to_string()
}

// ── Rule 7: Typography ───────────────────────────────────────────────────────

fn map_typography(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => {
                out.push('-')
            }
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\t' => out.push(' '),
            '\u{2192}' => out.push_str("->"),
            '\u{2264}' => out.push_str("<="),
            '\u{2265}' => out.push_str(">="),
            _ => out.push(c),
        }
    }
    out
}

// ── Rule 8: Invisible Unicode ────────────────────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 9: Characters outside the built-in font ─────────────────────────────

fn replace_unprintable(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\n' | '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => c,
            _ => '?',
        })
        .collect()
}

// ── Rule 10: Collapse blank lines ────────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 11: Final newline ───────────────────────────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        let input = "```text\nCANDIDATE: Jane\n```";
        assert_eq!(strip_fences(input), "CANDIDATE: Jane");
    }

    #[test]
    fn test_strip_fences_no_lang() {
        assert_eq!(strip_fences("```\nRANK: A\n```\n"), "RANK: A");
    }

    #[test]
    fn test_no_fences_passthrough() {
        assert_eq!(strip_fences("RANK: A"), "RANK: A");
    }

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_heading_markers() {
        assert_eq!(strip_heading_markers("## SCORES\ntext #1"), "SCORES\ntext #1");
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(strip_emphasis("**RANK:** A and __bold__"), "RANK: A and bold");
    }

    #[test]
    fn test_bullets() {
        assert_eq!(
            normalise_bullets("• one\n  * two\n- three"),
            "- one\n  - two\n- three"
        );
    }

    #[test]
    fn test_typography() {
        assert_eq!(
            map_typography("“Lead” – 5 yrs… it’s"),
            "\"Lead\" - 5 yrs... it's"
        );
    }

    #[test]
    fn test_remove_invisible() {
        assert_eq!(remove_invisible_chars("a\u{200B}b\u{FEFF}"), "ab");
    }

    #[test]
    fn test_latin1_kept_others_replaced() {
        assert_eq!(replace_unprintable("José 山田"), "José ??");
    }

    #[test]
    fn test_del_and_c1_controls_replaced() {
        assert_eq!(replace_unprintable("a\u{7F}b\u{85}c\u{9F}d\u{A0}"), "a?b?c?d\u{A0}");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_ensure_final_newline() {
        assert_eq!(ensure_final_newline("a\n\n\n"), "a\n");
        assert_eq!(ensure_final_newline(""), "\n");
    }

    #[test]
    fn test_clean_report_full_pipeline() {
        let raw = "```markdown\r\n## CANDIDATE: Jane Doe  \r\n\r\n\r\n\r\n**TOTAL:** 88/100\r\n• Led a team — 12 people\r\n```";
        let cleaned = clean_report(raw);
        assert_eq!(
            cleaned,
            "CANDIDATE: Jane Doe\n\nTOTAL: 88/100\n- Led a team - 12 people\n"
        );
    }
}
