use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::FusionError;
use crate::settings::groups::{builtin_group, is_valid_group_name, ExtensionGroup};

/// Immutable description of one fusion run. Built once from defaults
/// merged with the on-disk `treefuse.json`, validated, and never
/// mutated after admission checks begin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FusionConfig {
    /// Directory to scan. Relative values resolve against the process
    /// working directory at load time.
    pub root_directory: PathBuf,

    /// Which built-in (or plugin-registered) extension groups to admit.
    pub extension_groups: Vec<String>,

    /// Extra extensions admitted on top of the groups, without dots.
    pub additional_extensions: Vec<String>,

    /// Gitignore-style patterns excluded from the scan.
    pub ignore_patterns: Vec<String>,

    /// Honor .gitignore files found in the tree.
    pub use_gitignore: bool,

    /// Admit symlinks whose resolved target stays inside the root.
    pub allow_symlinks: bool,

    /// Retained symlink audit entries before the trail stops growing.
    pub symlink_audit_cap: usize,

    pub max_file_size_kb: u64,
    pub max_files: usize,
    pub max_total_size_mb: u64,

    /// Redact credential-shaped content before rendering.
    pub redact_secrets: bool,

    pub max_line_length: usize,
    pub max_token_length: usize,
    pub max_base64_length: usize,

    pub generate_text: bool,
    pub generate_markdown: bool,
    pub generate_html: bool,

    /// Base name for artifacts: `<name>.txt`, `<name>.md`, `<name>.html`
    /// and the `<name>.log` diagnostic file.
    pub generated_file_name: String,

    /// Where artifacts land. Defaults to the root directory.
    pub output_directory: Option<PathBuf>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            root_directory: PathBuf::from("."),
            extension_groups: vec![
                "web".to_string(),
                "backend".to_string(),
                "config".to_string(),
                "doc".to_string(),
            ],
            additional_extensions: Vec::new(),
            ignore_patterns: vec![
                "node_modules/".to_string(),
                "target/".to_string(),
                "dist/".to_string(),
                "build/".to_string(),
                ".git/".to_string(),
            ],
            use_gitignore: true,
            allow_symlinks: false,
            symlink_audit_cap: 64,
            max_file_size_kb: 1024,
            max_files: 200,
            max_total_size_mb: 25,
            redact_secrets: true,
            max_line_length: 5000,
            max_token_length: 1000,
            max_base64_length: 512,
            generate_text: true,
            generate_markdown: true,
            generate_html: false,
            generated_file_name: "fusion".to_string(),
            output_directory: None,
        }
    }
}

impl FusionConfig {
    /// Collects every problem with this configuration. Empty means
    /// valid. `extra_groups` are plugin-registered groups admitted on
    /// top of the built-in whitelist.
    pub fn findings(&self, extra_groups: &[ExtensionGroup]) -> Vec<String> {
        let mut findings = Vec::new();

        if !self.root_directory.is_dir() {
            findings.push(format!(
                "rootDirectory does not exist or is not a directory: {}",
                self.root_directory.display()
            ));
        }

        if !(self.generate_text || self.generate_markdown || self.generate_html) {
            findings.push("no output format enabled; enable at least one of generateText, generateMarkdown, generateHtml".to_string());
        }

        if self.max_files == 0 {
            findings.push("maxFiles must be at least 1".to_string());
        }
        if self.max_file_size_kb == 0 {
            findings.push("maxFileSizeKb must be at least 1".to_string());
        }
        if self.max_total_size_mb == 0 {
            findings.push("maxTotalSizeMb must be at least 1".to_string());
        }
        for (name, value) in [
            ("maxLineLength", self.max_line_length),
            ("maxTokenLength", self.max_token_length),
            ("maxBase64Length", self.max_base64_length),
        ] {
            if value < 16 {
                findings.push(format!("{name} must be at least 16, got {value}"));
            }
        }

        if self.generated_file_name.is_empty() {
            findings.push("generatedFileName must not be empty".to_string());
        } else if self
            .generated_file_name
            .chars()
            .any(|c| c == '/' || c == '\\')
            || self.generated_file_name.contains("..")
        {
            findings.push(format!(
                "generatedFileName must be a plain file name: {}",
                self.generated_file_name
            ));
        }

        for group in &self.extension_groups {
            let known = builtin_group(group).is_some()
                || extra_groups.iter().any(|g| &g.name == group);
            if !known {
                findings.push(format!("unknown extension group: {group}"));
            } else if !is_valid_group_name(group) {
                findings.push(format!("invalid extension group name: {group}"));
            }
        }

        for ext in &self.additional_extensions {
            if ext.is_empty() || ext.starts_with('.') || ext.contains('/') {
                findings.push(format!(
                    "additionalExtensions entries must be bare extensions without dots: {ext:?}"
                ));
            }
        }

        findings
    }

    /// Validation gate run before any file I/O.
    pub fn validate(&self, extra_groups: &[ExtensionGroup]) -> Result<(), FusionError> {
        let findings = self.findings(extra_groups);
        if findings.is_empty() {
            Ok(())
        } else {
            Err(FusionError::ConfigurationInvalid(findings.join("; ")))
        }
    }

    /// The admitted extension set: configured groups plus extras,
    /// lower-cased, without dots.
    pub fn admitted_extensions(&self, extra_groups: &[ExtensionGroup]) -> BTreeSet<String> {
        let mut extensions = BTreeSet::new();
        for group in &self.extension_groups {
            if let Some(exts) = builtin_group(group) {
                extensions.extend(exts.iter().map(|e| e.to_string()));
            } else if let Some(registered) = extra_groups.iter().find(|g| &g.name == group) {
                extensions.extend(registered.extensions.iter().cloned());
            }
        }
        extensions.extend(
            self.additional_extensions
                .iter()
                .map(|e| e.to_ascii_lowercase()),
        );
        extensions
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_kb * 1024
    }

    pub fn max_total_size_bytes(&self) -> u64 {
        self.max_total_size_mb * 1024 * 1024
    }

    /// Enabled built-in output format ids, in render order.
    pub fn enabled_formats(&self) -> Vec<&'static str> {
        let mut formats = Vec::new();
        if self.generate_text {
            formats.push("text");
        }
        if self.generate_markdown {
            formats.push("markdown");
        }
        if self.generate_html {
            formats.push("html");
        }
        formats
    }
}
