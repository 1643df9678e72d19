//! Identifier normalization for site, user, and enterprise-unit names.

/// Collapse every run of whitespace into a single `-`, then lower-case.
///
/// Leading and trailing whitespace become hyphens too; nothing is trimmed.
/// The result contains no whitespace, so normalizing twice is a no-op.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_whitespace = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('-');
                in_whitespace = true;
            }
        } else {
            in_whitespace = false;
            out.extend(ch.to_lowercase());
        }
    }
    out
}
