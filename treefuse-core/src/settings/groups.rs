/// A named bundle of file extensions that can be toggled on as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionGroup {
    pub name: String,
    /// Extensions without the leading dot, lower-case.
    pub extensions: Vec<String>,
}

/// Built-in group names. Lookups go through an explicit match so that
/// group-name validation can never be confused by inherited or
/// reserved identifiers.
pub const BUILTIN_GROUP_NAMES: &[&str] = &["web", "backend", "config", "scripts", "cpp", "doc"];

pub fn builtin_group(name: &str) -> Option<&'static [&'static str]> {
    match name {
        "web" => Some(&[
            "js", "jsx", "ts", "tsx", "html", "css", "scss", "less", "vue", "svelte",
        ]),
        "backend" => Some(&["rs", "go", "py", "rb", "java", "kt", "cs", "php", "ex", "swift"]),
        "config" => Some(&["json", "yaml", "yml", "toml", "ini", "env", "cfg", "conf"]),
        "scripts" => Some(&["sh", "bash", "zsh", "fish", "ps1", "bat", "cmd"]),
        "cpp" => Some(&["c", "h", "cc", "hh", "cpp", "hpp", "cxx", "hxx"]),
        "doc" => Some(&["md", "markdown", "txt", "rst", "adoc"]),
        _ => None,
    }
}

/// Valid shape for a group name, builtin or plugin-registered:
/// lower-case alphanumeric with interior dashes or underscores.
pub fn is_valid_group_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_name_resolves() {
        for name in BUILTIN_GROUP_NAMES {
            assert!(builtin_group(name).is_some(), "missing group {name}");
        }
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        assert!(builtin_group("constructor").is_none());
        assert!(builtin_group("__proto__").is_none());
        assert!(builtin_group("").is_none());
    }

    #[test]
    fn group_name_shapes() {
        assert!(is_valid_group_name("web"));
        assert!(is_valid_group_name("my-group_2"));
        assert!(!is_valid_group_name("Web"));
        assert!(!is_valid_group_name("2web"));
        assert!(!is_valid_group_name(""));
        assert!(!is_valid_group_name("bad name"));
    }
}
