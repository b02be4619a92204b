use std::sync::OnceLock;

use regex::Regex;

/// URI schemes that execute or smuggle content when rendered. Matched
/// only as scheme tokens (word boundary before, colon after), so
/// identifiers that merely contain these words are left alone.
fn dangerous_scheme() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\b(javascript|data|vbscript):").unwrap())
}

/// Rewrites `javascript:`, `data:` and `vbscript:` scheme tokens to
/// `[BLOCKED-<SCHEME>]:`, preserving the rest of the URI verbatim.
/// `http:`, `https:`, `ftp:` and `mailto:` never match.
pub fn neutralize_protocols(content: &str) -> (String, usize) {
    let mut count = 0usize;
    let replaced = dangerous_scheme().replace_all(content, |caps: &regex::Captures| {
        count += 1;
        format!("[BLOCKED-{}]:", caps[1].to_ascii_uppercase())
    });
    (replaced.into_owned(), count)
}
