//! Result rendering

pub mod formatter;
pub mod progress;
pub mod report;

pub use formatter::{OutputFormatter, ReportGenerator};
pub use report::EvaluationResult;
