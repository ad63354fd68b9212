pub mod hash;
pub mod response;

pub use hash::Identity;
pub use response::{BlockError, ParseReport, SkippedBlock, normalize_answer, parse, parse_with_report};
