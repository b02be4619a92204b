use std::collections::HashMap;

/// Deterministic slug generator shared by the table-of-contents pass
/// and the body pass. Two passes over the same ordered input must emit
/// identical anchors, which is why the per-slug counters are explicit
/// state with a reset rather than something derived from render
/// context.
#[derive(Debug, Default)]
pub struct AnchorAllocator {
    seen: HashMap<String, usize>,
}

impl AnchorAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears collision counters. Call at the start of every render
    /// pass.
    pub fn reset(&mut self) {
        self.seen.clear();
    }

    /// Allocates the next anchor for `raw`. Repeated normalized names
    /// get `-1`, `-2`, … suffixes, counted per distinct slug.
    pub fn slug(&mut self, raw: &str) -> String {
        let base = normalize(raw);
        let count = self.seen.entry(base.clone()).or_insert(0);
        let anchor = if *count == 0 {
            base.clone()
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        anchor
    }
}

/// Lower-cases, strips everything outside `[a-z0-9]`, and joins the
/// surviving runs with single hyphens. Empty input still needs a usable
/// anchor, so it falls back to `section`.
fn normalize(raw: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in raw.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            current.push(ch);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    if tokens.is_empty() {
        "section".to_string()
    } else {
        tokens.join("-")
    }
}
