use crate::file::types::FileRecord;
use crate::output::anchor::AnchorAllocator;
use crate::output::{OutputStrategy, RenderContext};
use crate::sanitize::protocol::neutralize_protocols;

/// Markdown rendering with a linked table of contents. Link text and
/// headings escape the characters that would change link or code
/// structure; dangerous URI schemes are neutralized again at render
/// time in case a hook reintroduced one after sanitization.
pub struct MarkdownStrategy {
    anchors: AnchorAllocator,
}

impl MarkdownStrategy {
    pub fn new() -> Self {
        Self {
            anchors: AnchorAllocator::new(),
        }
    }
}

impl Default for MarkdownStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputStrategy for MarkdownStrategy {
    fn id(&self) -> &str {
        "markdown"
    }

    fn file_extension(&self) -> &str {
        "md"
    }

    fn generate_header(&mut self, ctx: &RenderContext) -> String {
        self.anchors.reset();

        let mut out = String::new();
        out.push_str(&format!("# Project context: {}\n\n", escape_markdown(&ctx.root_label)));
        out.push_str(&format!(
            "_Generated: {} · {} files_\n\n",
            ctx.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            ctx.files.len()
        ));
        out.push_str("## Table of contents\n\n");
        for record in ctx.files {
            let name = record.relative_path.display().to_string();
            let anchor = self.anchors.slug(&name);
            let marker = if record.is_error_placeholder { "⚠ " } else { "" };
            out.push_str(&format!("- [{}{}](#{})\n", marker, escape_markdown(&name), anchor));
        }
        out.push('\n');

        // The body is a second pass over the same sequence and must
        // re-derive the same anchors from a clean state.
        self.anchors.reset();
        out
    }

    fn process_file(&mut self, record: &FileRecord) -> String {
        let name = record.relative_path.display().to_string();
        let anchor = self.anchors.slug(&name);

        let mut out = String::new();
        out.push_str("---\n\n");
        out.push_str(&format!("<a id=\"{anchor}\"></a>\n\n"));
        if record.is_error_placeholder {
            out.push_str(&format!("## ⚠ {}\n\n", escape_markdown(&name)));
            out.push_str(&format!("> ⚠ {}\n\n", escape_markdown(&record.content)));
        } else {
            out.push_str(&format!("## {}\n\n", escape_markdown(&name)));
            out.push_str(&format!("_{} bytes_\n\n", record.size));
            let (content, _) = neutralize_protocols(&record.content);
            let fence = fence_for(&content);
            out.push_str(&format!("{fence}\n{content}"));
            if !content.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&format!("{fence}\n\n"));
        }
        out
    }
}

/// Escapes the characters that are structural in link text and
/// headings: brackets, parentheses and backticks.
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '[' | ']' | '(' | ')' | '`' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// A fence longer than any backtick run in the content, so embedded
/// fences cannot terminate ours.
fn fence_for(content: &str) -> String {
    let mut longest = 0usize;
    let mut current = 0usize;
    for ch in content.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}
