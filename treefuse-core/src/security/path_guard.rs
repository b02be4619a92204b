use std::path::{Component, Path, PathBuf};

use crate::error::FusionError;

/// Resolves `candidate` against `root` and verifies containment.
///
/// The check is purely lexical: `.` and `..` components are folded
/// without consulting the filesystem, so nothing is read or stat'd for
/// a path that turns out to be out of bounds. Relative candidates
/// resolve against `root`, not the process working directory. The root
/// itself is in bounds; `root/..` is not. Symlinks are handled
/// separately by the symlink auditor after this check passes.
pub fn validate_secure_path(candidate: &Path, root: &Path) -> Result<PathBuf, FusionError> {
    let root = normalize(root);

    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };
    let resolved = normalize(&joined);

    if resolved == root || resolved.starts_with(&root) {
        Ok(resolved)
    } else {
        Err(FusionError::PathTraversal {
            path: candidate.to_path_buf(),
        })
    }
}

/// Folds `.` and `..` components lexically. A `..` that has nothing to
/// pop is kept, so escapes above the filesystem root stay visibly out
/// of bounds instead of wrapping back around to `/`.
fn normalize(path: &Path) -> PathBuf {
    let mut stack: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match stack.last() {
                Some(Component::Normal(_)) => {
                    stack.pop();
                }
                _ => stack.push(component),
            },
            other => stack.push(other),
        }
    }
    stack.iter().map(|c| c.as_os_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_itself_is_valid() {
        let root = Path::new("/workspace/project");
        let resolved = validate_secure_path(root, root).unwrap();
        assert_eq!(resolved, PathBuf::from("/workspace/project"));
    }

    #[test]
    fn descendants_are_valid() {
        let root = Path::new("/workspace/project");
        let resolved = validate_secure_path(Path::new("/workspace/project/src/lib.rs"), root);
        assert_eq!(resolved.unwrap(), PathBuf::from("/workspace/project/src/lib.rs"));
    }

    #[test]
    fn relative_candidates_resolve_against_root() {
        let root = Path::new("/workspace/project");
        let resolved = validate_secure_path(Path::new("src/main.rs"), root).unwrap();
        assert_eq!(resolved, PathBuf::from("/workspace/project/src/main.rs"));
    }

    #[test]
    fn parent_of_root_is_rejected() {
        let root = Path::new("/workspace/project");
        let err = validate_secure_path(Path::new("/workspace/project/.."), root).unwrap_err();
        assert!(matches!(err, FusionError::PathTraversal { .. }));
    }

    #[test]
    fn dotdot_inside_bounds_is_folded() {
        let root = Path::new("/workspace/project");
        let resolved =
            validate_secure_path(Path::new("/workspace/project/src/../docs/a.md"), root).unwrap();
        assert_eq!(resolved, PathBuf::from("/workspace/project/docs/a.md"));
    }

    #[test]
    fn relative_escape_is_rejected() {
        let root = Path::new("/workspace/project");
        let err = validate_secure_path(Path::new("../../etc/passwd"), root).unwrap_err();
        assert!(matches!(err, FusionError::PathTraversal { .. }));
    }

    #[test]
    fn sibling_with_shared_prefix_is_rejected() {
        // /workspace/project-evil shares a string prefix with the root but
        // is not a descendant of it.
        let root = Path::new("/workspace/project");
        let err = validate_secure_path(Path::new("/workspace/project-evil/x"), root).unwrap_err();
        assert!(matches!(err, FusionError::PathTraversal { .. }));
    }

    #[test]
    fn curdir_components_are_ignored() {
        let root = Path::new("/workspace/project");
        let resolved = validate_secure_path(Path::new("./src/./lib.rs"), root).unwrap();
        assert_eq!(resolved, PathBuf::from("/workspace/project/src/lib.rs"));
    }

    #[test]
    fn escape_above_filesystem_root_is_rejected() {
        let root = Path::new("/p");
        let err = validate_secure_path(Path::new("/../../x"), root).unwrap_err();
        assert!(matches!(err, FusionError::PathTraversal { .. }));
    }
}
