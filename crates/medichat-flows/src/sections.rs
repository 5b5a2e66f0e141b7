//! Slicing sectioned plain-text replies.
//!
//! The sectioned prompts ask the model for blocks introduced by upper-case
//! headers (`POTENTIAL CONDITIONS:`, `URGENCY ASSESSMENT:` ...). Models
//! decorate those headers freely (`1. `, `**`, `###`), so headers are matched
//! case-insensitively anywhere in the text and list decoration is stripped
//! from the lines afterwards.

use std::sync::LazyLock;

use regex::Regex;

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*•#>]+|\d{1,2}[.)])\s*").expect("list marker regex")
});

/// The body of the section introduced by `header`.
///
/// The body runs from the end of `header` to the start of the nearest
/// following header in `all_headers`, or to the end of the text. `None`
/// when `header` does not occur.
pub fn section<'a>(text: &'a str, header: &str, all_headers: &[&str]) -> Option<&'a str> {
    // ASCII lowering keeps byte offsets aligned with `text`.
    let haystack = text.to_ascii_lowercase();
    let start = haystack.find(&header.to_ascii_lowercase())? + header.len();

    let end = all_headers
        .iter()
        .filter(|h| !h.eq_ignore_ascii_case(header))
        .filter_map(|h| haystack[start..].find(&h.to_ascii_lowercase()))
        .map(|offset| start + offset)
        .min()
        .unwrap_or(text.len());

    Some(&text[start..end])
}

/// The non-empty lines of a section with list markers and bold removed.
pub fn section_lines(text: &str, header: &str, all_headers: &[&str]) -> Vec<String> {
    section(text, header, all_headers)
        .map(lines)
        .unwrap_or_default()
}

/// Split `body` into cleaned, non-empty lines.
pub fn lines(body: &str) -> Vec<String> {
    body.lines().filter_map(clean_line).collect()
}

/// Strip list decoration from one line.
///
/// Returns `None` for lines with no letters or digits left, such as the
/// `2.` that precedes the next numbered header.
pub fn clean_line(line: &str) -> Option<String> {
    let mut rest = line.trim();
    while let Some(m) = LIST_MARKER.find(rest) {
        if m.end() == 0 {
            break;
        }
        rest = rest[m.end()..].trim_start();
    }
    let cleaned = rest.replace("**", "").trim().to_string();
    cleaned
        .chars()
        .any(char::is_alphanumeric)
        .then_some(cleaned)
}

/// The value after `label:` on the first line that starts with `label`,
/// case-insensitive.
pub fn labelled<'a>(lines: &'a [String], label: &str) -> Option<&'a str> {
    lines.iter().find_map(|line| {
        let (head, value) = line.split_once(':')?;
        head.trim()
            .eq_ignore_ascii_case(label)
            .then(|| value.trim())
            .filter(|v| !v.is_empty())
    })
}

/// The first of `words` to occur in `text` as a whole word, by position.
///
/// Matching is case-insensitive; the returned value is the entry of
/// `words`, not the text as written.
pub fn first_word_of<'w>(text: &str, words: &[&'w str]) -> Option<&'w str> {
    let lowered = text.to_ascii_lowercase();
    words
        .iter()
        .filter_map(|w| find_word(&lowered, &w.to_ascii_lowercase()).map(|pos| (pos, *w)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, w)| w)
}

fn find_word(haystack: &str, word: &str) -> Option<usize> {
    haystack.match_indices(word).map(|(i, _)| i).find(|&i| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
