//! Terminal output: progress bars and the final report

pub mod progress;
pub mod report;
