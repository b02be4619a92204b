use crate::file::types::FileRecord;
use crate::output::{OutputStrategy, RenderContext};

const RULE: &str =
    "================================================================================";

/// Plain-text rendering. No escaping is applied and no anchors exist in
/// this format, so the anchor allocator is deliberately never invoked
/// here; the asymmetry with the other strategies is intentional.
pub struct TextStrategy;

impl TextStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputStrategy for TextStrategy {
    fn id(&self) -> &str {
        "text"
    }

    fn file_extension(&self) -> &str {
        "txt"
    }

    fn generate_header(&mut self, ctx: &RenderContext) -> String {
        let mut out = String::new();
        out.push_str(RULE);
        out.push('\n');
        out.push_str(&format!("PROJECT CONTEXT: {}\n", ctx.root_label));
        out.push_str(&format!(
            "Generated: {}\n",
            ctx.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out.push_str(&format!("Files: {}\n", ctx.files.len()));
        out.push_str(RULE);
        out.push('\n');
        out.push_str("\nContents:\n");
        for record in ctx.files {
            let marker = if record.is_error_placeholder { " ⚠" } else { "" };
            out.push_str(&format!("  - {}{}\n", record.relative_path.display(), marker));
        }
        out
    }

    fn process_file(&mut self, record: &FileRecord) -> String {
        let mut out = String::new();
        out.push('\n');
        out.push_str(RULE);
        out.push('\n');
        if record.is_error_placeholder {
            out.push_str(&format!(
                "FILE: {} ⚠ UNAVAILABLE\n",
                record.relative_path.display()
            ));
            out.push_str(RULE);
            out.push('\n');
            out.push_str(&format!("{}\n", record.content));
        } else {
            out.push_str(&format!(
                "FILE: {} ({} bytes)\n",
                record.relative_path.display(),
                record.size
            ));
            out.push_str(RULE);
            out.push('\n');
            out.push_str(&record.content);
            if !record.content.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}
