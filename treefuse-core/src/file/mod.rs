pub mod collector;
pub mod sniff;
pub mod types;

pub use collector::{Admission, CollectorOutcome, FileCollector};
pub use types::{FileCandidate, FileRecord};
