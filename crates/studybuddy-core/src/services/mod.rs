//! High-level study task orchestration.

pub mod study;

pub use study::{HistoryEntry, StudyService, MAX_HISTORY_ENTRIES};
