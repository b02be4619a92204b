pub mod path_guard;
pub mod symlink;

pub use path_guard::validate_secure_path;
pub use symlink::{SymlinkAuditEntry, SymlinkAuditor, SymlinkVerdict};
