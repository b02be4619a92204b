pub mod anchor;
pub mod html;
pub mod markdown;
pub mod text;

use chrono::{DateTime, Utc};

use crate::file::types::FileRecord;
use crate::settings::FusionConfig;

pub use anchor::AnchorAllocator;
pub use html::HtmlStrategy;
pub use markdown::MarkdownStrategy;
pub use text::TextStrategy;

/// Everything a strategy needs to render a run: the admitted records in
/// their final order, plus presentation metadata.
pub struct RenderContext<'a> {
    pub root_label: String,
    pub generated_at: DateTime<Utc>,
    pub files: &'a [FileRecord],
}

/// A per-format renderer. `generate_header` is the first pass over the
/// file sequence (title and table of contents where the format has
/// one); `process_file` is called once per record, in the same order,
/// and must produce anchors identical to the header pass. Strategies
/// own their anchor state, which is why these take `&mut self`.
pub trait OutputStrategy: Send + Sync {
    fn id(&self) -> &str;
    fn file_extension(&self) -> &str;
    fn generate_header(&mut self, ctx: &RenderContext) -> String;
    fn process_file(&mut self, record: &FileRecord) -> String;
    fn generate_footer(&self, _ctx: &RenderContext) -> String {
        String::new()
    }
}

/// The built-in strategies enabled by this configuration, in render
/// order.
pub fn builtin_strategies(config: &FusionConfig) -> Vec<Box<dyn OutputStrategy>> {
    let mut strategies: Vec<Box<dyn OutputStrategy>> = Vec::new();
    if config.generate_text {
        strategies.push(Box::new(TextStrategy::new()));
    }
    if config.generate_markdown {
        strategies.push(Box::new(MarkdownStrategy::new()));
    }
    if config.generate_html {
        strategies.push(Box::new(HtmlStrategy::new()));
    }
    strategies
}
