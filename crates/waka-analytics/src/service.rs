//! Fetch-then-aggregate entry points shared by every hosting adapter.

use crate::aggregations::{Aggregator, SummaryOutput};
use std::future::Future;
use waka_core::error::Result;
use waka_core::{RangeSelector, SummaryFetcher};

/// Fetch the summaries for `range` and aggregate them.
pub async fn get_summary(fetcher: &SummaryFetcher, range: &RangeSelector) -> Result<SummaryOutput> {
    let resp = fetcher.fetch(range).await?;
    Ok(Aggregator::summarize(&resp.data))
}

/// [`get_summary`], aborted with `WakaError::Cancelled` once `cancel` completes.
pub async fn get_summary_with_cancel<C>(
    fetcher: &SummaryFetcher,
    range: &RangeSelector,
    cancel: C,
) -> Result<SummaryOutput>
where
    C: Future<Output = ()>,
{
    let resp = fetcher.fetch_with_cancel(range, cancel).await?;
    Ok(Aggregator::summarize(&resp.data))
}
