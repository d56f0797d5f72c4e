//! Stats module - aggregation over the in-memory ledger
//!
//! Features:
//! - Grouping entries by calendar date
//! - Per-day best values for strength charts
//! - Body-weight trend
//!
//! Everything here is a pure function of its inputs.

pub mod aggregator;
pub mod progress;

pub use aggregator::{GroupedWorkouts, dates_with_entries, group_by_date};
pub use progress::{DEFAULT_PROGRESS_LIMIT, ProgressSeries, project, weight_series};
