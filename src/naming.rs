//! Filesystem-safe name construction.
//!
//! Shared by the tag writer (final track names) and the library finisher
//! (sanitized renames). Patterns use `{placeholder}` substitution; a
//! placeholder with no value fills as `"n/a"` so a partially resolved
//! pattern still yields a usable name.

/// Replaces characters that are reserved on common filesystems.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// Substitute `{key}` placeholders from `fields`; unknown placeholders
/// fill as `"n/a"`.
pub fn fill_pattern(pattern: &str, fields: &[(&str, &str)]) -> String {
    let mut out = pattern.to_string();
    for (key, value) in fields {
        let value = if value.is_empty() { "n/a" } else { value };
        out = out.replace(&format!("{{{key}}}"), value);
    }
    // Any placeholder left unfilled resolves to "n/a" rather than leaking
    // braces into a filename.
    while let (Some(open), Some(close)) = (out.find('{'), out.find('}')) {
        if close < open {
            break;
        }
        out.replace_range(open..=close, "n/a");
    }
    out
}
