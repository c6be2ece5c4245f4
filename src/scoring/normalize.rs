use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercases, folds accents away (NFKD minus combining marks), turns anything
/// outside `[a-z0-9']` into whitespace and collapses whitespace runs.
///
/// The output only ever contains `[a-z0-9']` and single spaces, so applying it
/// twice is the same as applying it once.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .map(|ch| {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '\'' {
                ch
            } else {
                ' '
            }
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes each line on its own, dropping lines that end up empty.
pub fn normalized_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(normalize_text)
        .filter(|line| !line.is_empty())
        .collect()
}
