pub mod batch;
pub mod burn;
pub mod scan_finder;

pub use crate::domain::model::{BatchReport, BurnOutcome, ScanSummary, SkipReason};
pub use crate::domain::ports::{ArchiveApi, OutputStorage};
pub use crate::utils::error::Result;
