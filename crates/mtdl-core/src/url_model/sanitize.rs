//! Filesystem-safe filename sanitization.

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Sanitizes a candidate filename for safe use on Linux.
///
/// NUL, `/`, `\`, whitespace and control characters become `_` (runs collapsed),
/// leading/trailing dots and underscores are trimmed and the result is cut to
/// 255 bytes on a char boundary.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let mapped = match c {
            '\0' | '/' | '\\' | ' ' | '\t' => '_',
            c if c.is_control() => '_',
            c => c,
        };
        if mapped == '_' && prev_underscore {
            continue;
        }
        prev_underscore = mapped == '_';
        out.push(mapped);
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
