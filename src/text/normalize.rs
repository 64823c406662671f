//! Normalization pipeline for extracted document text.
//!
//! Page extraction leaves artifacts behind: hard-wrapped lines inside
//! paragraphs, dropped spaces after sentence punctuation, and words merged
//! across column boundaries. The pipeline is a fixed, ordered table of
//! passes; each pass operates on the output of the previous one, and each is
//! unit-testable in isolation.

/// The ordered pass table. Order matters: soft line breaks are merged before
/// horizontal whitespace is collapsed, and blank-line collapsing runs before
/// the final trim.
const PASSES: &[fn(&str) -> String] = &[
    canonicalize_whitespace_chars,
    merge_soft_line_breaks,
    restore_space_after_punctuation,
    split_merged_words,
    collapse_horizontal_whitespace,
    collapse_blank_lines,
    trim_edges,
];

/// Run the full pipeline over one piece of text.
///
/// Empty input is returned unchanged. The pipeline is idempotent:
/// `normalize(normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    PASSES
        .iter()
        .fold(text.to_owned(), |acc, pass| pass(&acc))
}

/// Normalize a sequence of pages.
///
/// Each page is normalized independently, pages are joined with a blank
/// line, and the joined result is passed through the pipeline once more to
/// repair artifacts introduced at the page-join boundaries.
#[must_use]
pub fn normalize_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let cleaned: Vec<String> = pages.iter().map(|p| normalize(p.as_ref())).collect();
    normalize(&cleaned.join("\n\n"))
}

/// Replace non-breaking spaces with regular spaces and carriage returns with
/// line feeds.
fn canonicalize_whitespace_chars(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{00A0}' => ' ',
            '\r' => '\n',
            other => other,
        })
        .collect()
}

/// Replace a line feed with a space when it is not adjacent to another line
/// feed. A lone newline is a soft wrap inside a paragraph; a blank line is an
/// intentional paragraph break and is preserved.
fn merge_soft_line_breaks(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == '\n' {
            let prev_is_newline = i > 0 && chars[i - 1] == '\n';
            let next_is_newline = chars.get(i + 1) == Some(&'\n');
            if !prev_is_newline && !next_is_newline {
                out.push(' ');
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Insert a space after `. ! ? ; : ,` when a letter follows directly.
fn restore_space_after_punctuation(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        out.push(c);
        if matches!(c, '.' | '!' | '?' | ';' | ':' | ',')
            && chars.get(i + 1).is_some_and(|next| next.is_alphabetic())
        {
            out.push(' ');
        }
    }
    out
}

/// Insert a space between a lowercase letter and an uppercase letter that
/// follow each other directly.
fn split_merged_words(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        out.push(c);
        if c.is_lowercase() && chars.get(i + 1).is_some_and(|next| next.is_uppercase()) {
            out.push(' ');
        }
    }
    out
}

/// Collapse runs of spaces and tabs into a single space. Line feeds are left
/// alone; they are handled by the line-oriented passes.
fn collapse_horizontal_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c == ' ' || c == '\t' {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            in_run = false;
            out.push(c);
        }
    }
    out
}

/// Collapse runs of three or more line feeds into exactly two.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newline_run = 0usize;
    for c in text.chars() {
        if c == '\n' {
            newline_run += 1;
            continue;
        }
        flush_newlines(&mut out, newline_run);
        newline_run = 0;
        out.push(c);
    }
    flush_newlines(&mut out, newline_run);
    out
}

fn flush_newlines(out: &mut String, run: usize) {
    let count = if run >= 3 { 2 } else { run };
    for _ in 0..count {
        out.push('\n');
    }
}

fn trim_edges(text: &str) -> String {
    text.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_unchanged() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn nbsp_and_cr_are_canonicalized() {
        assert_eq!(
            canonicalize_whitespace_chars("a\u{00A0}b\rc"),
            "a b\nc".to_owned()
        );
    }

    #[test]
    fn single_line_break_merges_into_paragraph() {
        assert_eq!(normalize("line one\nline two"), "line one line two");
    }

    #[test]
    fn paragraph_break_is_preserved() {
        assert_eq!(normalize("line one\n\nline two"), "line one\n\nline two");
    }

    #[test]
    fn space_is_restored_after_sentence_punctuation() {
        assert_eq!(normalize("First.Second"), "First. Second");
        assert_eq!(normalize("one,two;three"), "one, two; three");
    }

    #[test]
    fn punctuation_before_digit_is_untouched() {
        assert_eq!(normalize("pi is 3.14"), "pi is 3.14");
    }

    #[test]
    fn merged_case_boundary_is_split() {
        assert_eq!(normalize("endStart"), "end Start");
    }

    #[test]
    fn horizontal_whitespace_collapses() {
        assert_eq!(normalize("a  \t b"), "a b");
    }

    #[test]
    fn runs_of_blank_lines_collapse_to_one_blank_line() {
        assert_eq!(normalize("a\n\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn edges_are_trimmed() {
        assert_eq!(normalize("  spaced out  "), "spaced out");
    }

    #[test]
    fn pipeline_is_idempotent() {
        let inputs = [
            "wrapped\nline with.MissingSpace andMerged words",
            "  a\u{00A0}b\r\nc  \n\n\n\nd  ",
            "plain text, already clean.",
            "e.g.X then 3.14 and aB",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn pages_are_joined_with_a_blank_line_and_renormalized() {
        let pages = ["First page\nwrapped.", "", "Second page"];
        assert_eq!(
            normalize_pages(&pages),
            "First page wrapped.\n\nSecond page"
        );
    }

    #[test]
    fn page_join_artifacts_are_repaired_by_second_pass() {
        // Each page is clean on its own; the empty page would otherwise leave
        // a run of blank lines at the join.
        let pages = ["a", "b", "c"];
        assert_eq!(normalize_pages(&pages), "a\n\nb\n\nc");
    }
}
