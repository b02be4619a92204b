pub mod clip;
pub mod protocol;
pub mod secrets;

pub use clip::ClipLimits;

use crate::settings::FusionConfig;

/// What sanitization did to one file's content.
#[derive(Debug, Clone)]
pub struct SanitizeOutcome {
    pub content: String,
    pub redactions: usize,
    pub blocked_protocols: usize,
    pub clips: usize,
}

/// Applies the three passes in a fixed order: secret redaction
/// (config-gated), protocol neutralization, then shape clipping.
/// Each pass is independent; none of them can fail on valid UTF-8, so
/// rejection of undecodable content happens before this point.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    redact_secrets: bool,
    limits: ClipLimits,
}

impl Sanitizer {
    pub fn from_config(config: &FusionConfig) -> Self {
        Self {
            redact_secrets: config.redact_secrets,
            limits: ClipLimits {
                max_line_length: config.max_line_length,
                max_token_length: config.max_token_length,
                max_base64_length: config.max_base64_length,
            },
        }
    }

    pub fn apply(&self, content: &str) -> SanitizeOutcome {
        let (content, redactions) = if self.redact_secrets {
            secrets::redact_secrets(content)
        } else {
            (content.to_string(), 0)
        };
        let (content, blocked_protocols) = protocol::neutralize_protocols(&content);
        let (content, clips) = clip::clip_content(&content, &self.limits);
        SanitizeOutcome {
            content,
            redactions,
            blocked_protocols,
            clips,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitizer(redact: bool) -> Sanitizer {
        Sanitizer {
            redact_secrets: redact,
            limits: ClipLimits {
                max_line_length: 200,
                max_token_length: 100,
                max_base64_length: 64,
            },
        }
    }

    #[test]
    fn passes_compose() {
        let input = "api_key = \"sk-abcdef123456\"\nlink javascript:alert(1)\n";
        let outcome = sanitizer(true).apply(input);
        assert_eq!(outcome.redactions, 1);
        assert_eq!(outcome.blocked_protocols, 1);
        assert!(outcome.content.contains("api_key = [REDACTED]"));
        assert!(outcome.content.contains("[BLOCKED-JAVASCRIPT]:alert(1)"));
    }

    #[test]
    fn redaction_can_be_disabled() {
        let input = "api_key = \"sk-abcdef123456\"";
        let outcome = sanitizer(false).apply(input);
        assert_eq!(outcome.redactions, 0);
        assert!(outcome.content.contains("sk-abcdef123456"));
    }

    #[test]
    fn clean_content_is_reported_clean() {
        let outcome = sanitizer(true).apply("fn main() {}\n");
        assert_eq!(outcome.redactions, 0);
        assert_eq!(outcome.blocked_protocols, 0);
        assert_eq!(outcome.clips, 0);
        assert_eq!(outcome.content, "fn main() {}\n");
    }
}
