//! Breakdown aggregation over per-day summaries.
//!
//! Languages, editors and projects are reduced independently: each kind gets
//! its own totals and its own percentage denominator.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use waka_core::types::{RawDaySummary, RawEntity};

/// Name used for entries the upstream left unnamed.
pub const UNKNOWN_NAME: &str = "Unknown";

/// One named bucket's share of tracked time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityBreakdown {
    pub name: String,
    pub total_seconds: u64,
    /// Share of this kind's total, 0..=100.
    pub percent: f64,
    /// Human-readable duration, e.g. "1h 30m".
    pub digital: String,
}

/// Window covered by the aggregated days, as reported by the upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// Final display-ready summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub human_readable_total: String,
    pub total_seconds: u64,
    pub languages: Vec<EntityBreakdown>,
    pub editors: Vec<EntityBreakdown>,
    pub projects: Vec<EntityBreakdown>,
    pub range: SummaryRange,
    /// RFC 3339 timestamp of when aggregation ran.
    #[serde(rename = "cachedAt")]
    pub cached_at: String,
}

/// Per-name second totals, remembering first-seen order.
#[derive(Default)]
struct Tally {
    totals: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl Tally {
    fn add(&mut self, entity: &RawEntity) {
        let name = match entity.name.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => UNKNOWN_NAME,
        };
        match self.index.get(name) {
            Some(&i) => self.totals[i].1 += entity.total_seconds,
            None => {
                self.index.insert(name.to_string(), self.totals.len());
                self.totals.push((name.to_string(), entity.total_seconds));
            }
        }
    }

    fn into_breakdown(self) -> Vec<EntityBreakdown> {
        // Floor the summed totals once; percent uses the same whole seconds.
        let totals: Vec<(String, u64)> = self
            .totals
            .into_iter()
            .map(|(name, secs)| (name, whole_seconds(secs)))
            .collect();
        let grand: u64 = totals.iter().map(|(_, secs)| *secs).sum();

        let mut breakdown: Vec<EntityBreakdown> = totals
            .into_iter()
            .map(|(name, total_seconds)| EntityBreakdown {
                percent: percent_of(total_seconds, grand),
                digital: format_duration(total_seconds),
                name,
                total_seconds,
            })
            .collect();

        // Stable: equal totals keep first-seen order.
        breakdown.sort_by(|a, b| b.total_seconds.cmp(&a.total_seconds));
        breakdown
    }
}

fn whole_seconds(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    }
}

fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Reduces raw per-day summaries into a [`SummaryOutput`].
///
/// Pure and total: malformed input has already been defaulted during
/// deserialization, so there is nothing left to fail on.
pub struct Aggregator;

impl Aggregator {
    /// Aggregate using the current time for `cachedAt`.
    pub fn summarize(days: &[RawDaySummary]) -> SummaryOutput {
        Self::aggregate(days, Utc::now())
    }

    /// Aggregate with an explicit aggregation timestamp.
    pub fn aggregate(days: &[RawDaySummary], now: DateTime<Utc>) -> SummaryOutput {
        let mut languages = Tally::default();
        let mut editors = Tally::default();
        let mut projects = Tally::default();
        let mut grand_seconds: f64 = 0.0;

        for day in days {
            day.languages.iter().for_each(|e| languages.add(e));
            day.editors.iter().for_each(|e| editors.add(e));
            day.projects.iter().for_each(|e| projects.add(e));
            grand_seconds += day.grand_total.total_seconds;
        }
        let total_seconds = whole_seconds(grand_seconds);

        let range = SummaryRange {
            start: days
                .first()
                .and_then(|d| d.range.as_ref())
                .and_then(|r| r.start.clone()),
            end: days
                .last()
                .and_then(|d| d.range.as_ref())
                .and_then(|r| r.end.clone()),
        };

        tracing::debug!(
            "Aggregated {} days: {} languages, {} editors, {} projects",
            days.len(),
            languages.totals.len(),
            editors.totals.len(),
            projects.totals.len(),
        );

        SummaryOutput {
            human_readable_total: format_duration(total_seconds),
            total_seconds,
            languages: languages.into_breakdown(),
            editors: editors.into_breakdown(),
            projects: projects.into_breakdown(),
            range,
            cached_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Format seconds as a human-readable duration string.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
