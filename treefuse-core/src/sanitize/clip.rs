use std::sync::OnceLock;

use regex::Regex;

pub const LINE_MARKER: &str = "[TRUNCATED:line]";
pub const TOKEN_MARKER: &str = "[TRUNCATED:token]";
pub const BASE64_MARKER: &str = "[TRUNCATED:base64]";

/// Shape limits applied to admitted text. Oversized pieces are
/// truncated in place with an inline marker so the artifact shows that
/// something was removed.
#[derive(Debug, Clone, Copy)]
pub struct ClipLimits {
    pub max_line_length: usize,
    pub max_token_length: usize,
    pub max_base64_length: usize,
}

/// Candidate base64 runs. Anything shorter than this floor is not worth
/// inspecting regardless of the configured limit.
fn base64_run() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[A-Za-z0-9+/]{40,}={0,2}").unwrap())
}

fn token_run() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\S+").unwrap())
}

/// Applies base64, token and line clipping per line, in that order.
/// Returns the clipped text and the number of truncations performed.
pub fn clip_content(content: &str, limits: &ClipLimits) -> (String, usize) {
    let mut clips = 0usize;
    let lines: Vec<String> = content
        .split('\n')
        .map(|line| {
            let line = clip_base64(line, limits.max_base64_length, &mut clips);
            let line = clip_tokens(&line, limits.max_token_length, &mut clips);
            clip_line(&line, limits.max_line_length, &mut clips)
        })
        .collect();
    (lines.join("\n"), clips)
}

fn clip_base64(line: &str, limit: usize, clips: &mut usize) -> String {
    base64_run()
        .replace_all(line, |caps: &regex::Captures| {
            let run = &caps[0];
            if run.chars().count() > limit {
                *clips += 1;
                format!("{}{}", truncate_chars(run, limit), BASE64_MARKER)
            } else {
                run.to_string()
            }
        })
        .into_owned()
}

fn clip_tokens(line: &str, limit: usize, clips: &mut usize) -> String {
    token_run()
        .replace_all(line, |caps: &regex::Captures| {
            let token = &caps[0];
            if token.chars().count() > limit {
                *clips += 1;
                format!("{}{}", truncate_chars(token, limit), TOKEN_MARKER)
            } else {
                token.to_string()
            }
        })
        .into_owned()
}

fn clip_line(line: &str, limit: usize, clips: &mut usize) -> String {
    if line.chars().count() > limit {
        *clips += 1;
        format!("{}{}", truncate_chars(line, limit), LINE_MARKER)
    } else {
        line.to_string()
    }
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ClipLimits {
        ClipLimits {
            max_line_length: 200,
            max_token_length: 80,
            max_base64_length: 48,
        }
    }

    #[test]
    fn short_content_is_untouched() {
        let src = "fn main() {\n    println!(\"ok\");\n}\n";
        let (out, clips) = clip_content(src, &limits());
        assert_eq!(out, src);
        assert_eq!(clips, 0);
    }

    #[test]
    fn long_line_is_truncated_with_marker() {
        let line = "x ".repeat(120);
        let (out, clips) = clip_content(&line, &limits());
        assert_eq!(clips, 1);
        assert!(out.ends_with(LINE_MARKER));
        assert!(out.chars().count() <= 200 + LINE_MARKER.len());
    }

    #[test]
    fn long_token_is_truncated_with_marker() {
        let token = "a".repeat(100);
        let src = format!("short {token} short");
        let (out, clips) = clip_content(&src, &limits());
        assert_eq!(clips, 1);
        assert!(out.contains(TOKEN_MARKER));
        assert!(out.starts_with("short "));
        assert!(out.ends_with(" short"));
    }

    #[test]
    fn base64_block_is_truncated_with_marker() {
        let block = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdef0123456789".repeat(3);
        let (out, clips) = clip_content(&block, &limits());
        assert_eq!(clips, 1);
        assert!(out.contains(BASE64_MARKER));
    }

    #[test]
    fn multibyte_content_is_truncated_on_char_boundaries() {
        let line = "é ".repeat(150);
        let (out, clips) = clip_content(&line, &limits());
        assert_eq!(clips, 1);
        assert!(out.ends_with(LINE_MARKER));
    }

    #[test]
    fn newlines_are_preserved() {
        let src = "a\nb\nc";
        let (out, _) = clip_content(src, &limits());
        assert_eq!(out, src);
    }
}
