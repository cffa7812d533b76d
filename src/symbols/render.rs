//! Canonical text for declarations stored in the symbol table.
//!
//! Declaration text comes straight from the `.d.ts` source, so it carries
//! whatever layout and comments the author used. These helpers reduce it to a
//! stable form: comments removed, function signatures on one line, everything
//! else re-indented four spaces per nesting level.

use std::ops::Range;

const INDENT: &str = "    ";

/// Remove the given byte ranges (relative to `text`) from `text`.
///
/// Ranges must be sorted and non-overlapping; out-of-bounds ranges are clamped.
pub fn strip_ranges(text: &str, ranges: &[Range<usize>]) -> String {
    let mut result = String::with_capacity(text.len());
    let mut cursor = 0;
    for range in ranges {
        let start = range.start.min(text.len()).max(cursor);
        let end = range.end.min(text.len()).max(start);
        result.push_str(&text[cursor..start]);
        cursor = end;
    }
    result.push_str(&text[cursor..]);
    result
}

/// Collapse runs of whitespace into single spaces and trim the ends.
///
/// Used for function signatures so that parameter lists spread over several
/// lines end up as `f(a: string, b: number): T;`.
pub fn collapse_whitespace(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let mut prev_was_space = false;

    for ch in source.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(ch);
            prev_was_space = false;
        }
    }

    result.trim().replace("( ", "(").replace(" )", ")")
}

/// Drop blank lines and re-indent every line by bracket depth.
pub fn reindent(source: &str) -> String {
    let mut lines = Vec::new();
    let mut depth: usize = 0;

    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let leading_closers = line
            .chars()
            .take_while(|c| matches!(c, '}' | ']' | ')'))
            .count();
        let indent = depth.saturating_sub(leading_closers);
        lines.push(format!("{}{}", INDENT.repeat(indent), line));

        let delta = bracket_delta(line);
        depth = if delta < 0 {
            depth.saturating_sub(delta.unsigned_abs())
        } else {
            depth + delta as usize
        };
    }

    lines.join("\n")
}

/// Net change in bracket depth across one line, ignoring quoted text.
fn bracket_delta(line: &str) -> isize {
    let mut delta = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in line.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' | '`' => quote = Some(ch),
            '{' | '[' | '(' => delta += 1,
            '}' | ']' | ')' => delta -= 1,
            _ => {}
        }
    }

    delta
}
