//! Aggregation for waka-proxy.
//!
//! Reduces the upstream's per-day summaries into sorted, percentage-annotated
//! breakdowns by language, editor and project, plus an overall total.

pub mod aggregations;
pub mod service;

pub use aggregations::{format_duration, Aggregator, EntityBreakdown, SummaryOutput, SummaryRange};
pub use service::{get_summary, get_summary_with_cancel};
