#![forbid(unsafe_code)]

//! Line-shaping helpers for views that pre-wrap their content.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Split `text` into chunks that fit `width` columns.
///
/// The first chunk holds `width` characters; every later chunk is `prefix`
/// followed by `width - prefix` characters, so continuation lines line up
/// under the first. Empty input yields one empty line. Each chunk takes at
/// least one character, so tiny widths still terminate.
pub fn split_by_length(text: &str, width: usize, prefix: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }

    let prefix_len = prefix.chars().count();
    let first = width.max(1);
    let rest = width.saturating_sub(prefix_len).max(1);

    let mut lines = Vec::with_capacity(chars.len() / rest + 1);
    let mut from = 0;
    while from < chars.len() {
        let step = if from == 0 { first } else { rest };
        let to = (from + step).min(chars.len());
        let chunk: String = chars[from..to].iter().collect();
        if from == 0 {
            lines.push(chunk);
        } else {
            lines.push(format!("{prefix}{chunk}"));
        }
        from = to;
    }
    lines
}

/// Cut `text` to at most `max` columns, ending in `…` when it was cut.
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Pad `text` with spaces on the right up to `width` columns.
pub fn pad_right(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(pad))
}

/// Pad `text` with spaces on the left up to `width` columns.
pub fn pad_left(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    format!("{}{text}", " ".repeat(pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_uses_prefix_on_continuations() {
        assert_eq!(
            split_by_length("abcdefgh", 4, "  "),
            vec!["abcd", "  ef", "  gh"]
        );
    }

    #[test]
    fn split_short_and_empty() {
        assert_eq!(split_by_length("abc", 10, ">"), vec!["abc"]);
        assert_eq!(split_by_length("", 10, ">"), vec![""]);
    }

    #[test]
    fn split_terminates_when_prefix_is_wider_than_width() {
        let lines = split_by_length("abcd", 2, "....");
        assert_eq!(lines, vec!["ab", "....c", "....d"]);
    }

    #[test]
    fn split_counts_characters_not_bytes() {
        assert_eq!(split_by_length("ääää", 2, ""), vec!["ää", "ää"]);
    }

    #[test]
    fn truncate_adds_ellipsis_only_when_cut() {
        assert_eq!(truncate_with_ellipsis("hello", 5), "hello");
        assert_eq!(truncate_with_ellipsis("hello world", 6), "hello…");
        assert_eq!(truncate_with_ellipsis("hello", 0), "");
        assert_eq!(truncate_with_ellipsis("hello", 1), "…");
    }

    #[test]
    fn padding() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_left("ab", 4), "  ab");
        assert_eq!(pad_left("abcdef", 4), "abcdef");
    }
}
