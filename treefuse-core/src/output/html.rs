use crate::file::types::FileRecord;
use crate::output::anchor::AnchorAllocator;
use crate::output::{OutputStrategy, RenderContext};

/// HTML rendering. Every piece of external text (file names, content,
/// placeholder reasons) passes through [`escape_html`] exactly once, so
/// no combination of path and content can open a tag, an attribute
/// boundary, or a script context. The document carries fixed security
/// meta tags regardless of configuration.
pub struct HtmlStrategy {
    anchors: AnchorAllocator,
}

impl HtmlStrategy {
    pub fn new() -> Self {
        Self {
            anchors: AnchorAllocator::new(),
        }
    }
}

impl Default for HtmlStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputStrategy for HtmlStrategy {
    fn id(&self) -> &str {
        "html"
    }

    fn file_extension(&self) -> &str {
        "html"
    }

    fn generate_header(&mut self, ctx: &RenderContext) -> String {
        self.anchors.reset();
        let title = escape_html(&ctx.root_label);

        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str(
            "<meta http-equiv=\"Content-Security-Policy\" content=\"default-src 'none'; style-src 'unsafe-inline'\">\n",
        );
        out.push_str("<meta http-equiv=\"X-Frame-Options\" content=\"DENY\">\n");
        out.push_str("<meta http-equiv=\"X-Content-Type-Options\" content=\"nosniff\">\n");
        out.push_str("<meta name=\"referrer\" content=\"no-referrer\">\n");
        out.push_str(&format!("<title>Project context: {title}</title>\n"));
        out.push_str(STYLE);
        out.push_str("</head>\n<body>\n");
        out.push_str(&format!("<h1>Project context: {title}</h1>\n"));
        out.push_str(&format!(
            "<p class=\"meta\">Generated {} · {} files</p>\n",
            ctx.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            ctx.files.len()
        ));

        out.push_str("<nav>\n<ul>\n");
        for record in ctx.files {
            let name = record.relative_path.display().to_string();
            let anchor = self.anchors.slug(&name);
            let marker = if record.is_error_placeholder {
                "⚠ "
            } else {
                ""
            };
            out.push_str(&format!(
                "<li><a href=\"#{anchor}\">{marker}{}</a></li>\n",
                escape_html(&name)
            ));
        }
        out.push_str("</ul>\n</nav>\n<main>\n");

        // The body pass re-derives the same anchor sequence.
        self.anchors.reset();
        out
    }

    fn process_file(&mut self, record: &FileRecord) -> String {
        let name = record.relative_path.display().to_string();
        let anchor = self.anchors.slug(&name);
        let escaped_name = escape_html(&name);

        let mut out = String::new();
        if record.is_error_placeholder {
            out.push_str(&format!("<section id=\"{anchor}\" class=\"file error\">\n"));
            out.push_str(&format!("<h2>⚠ {escaped_name}</h2>\n"));
            out.push_str(&format!(
                "<p class=\"reason\">⚠ {}</p>\n",
                escape_html(&record.content)
            ));
        } else {
            out.push_str(&format!("<section id=\"{anchor}\" class=\"file\">\n"));
            out.push_str(&format!("<h2>{escaped_name}</h2>\n"));
            out.push_str(&format!("<p class=\"meta\">{} bytes</p>\n", record.size));
            out.push_str(&format!(
                "<pre><code>{}</code></pre>\n",
                escape_html(&record.content)
            ));
        }
        out.push_str("</section>\n");
        out
    }

    fn generate_footer(&self, _ctx: &RenderContext) -> String {
        "</main>\n</body>\n</html>\n".to_string()
    }
}

const STYLE: &str = "<style>\n\
    body { font-family: monospace; margin: 2rem auto; max-width: 60rem; }\n\
    nav ul { list-style: none; padding-left: 0; }\n\
    .meta { color: #666; }\n\
    .error h2, .reason { color: #a00; }\n\
    pre { background: #f6f6f6; padding: 1rem; overflow-x: auto; }\n\
</style>\n";

/// Escapes the HTML reserved set plus the characters the sanitizer's
/// own vocabulary uses (`=`, `/`, `{`, `}`, `$`). Applied exactly once
/// per render; already-escaped input therefore double-escapes, which is
/// the correct behavior for faithful source display.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '=' => out.push_str("&#x3D;"),
            '/' => out.push_str("&#x2F;"),
            '{' => out.push_str("&#x7B;"),
            '}' => out.push_str("&#x7D;"),
            '$' => out.push_str("&#x24;"),
            _ => out.push(ch),
        }
    }
    out
}
