pub mod config;
pub mod error;
pub mod fetcher;
pub mod range;
pub mod types;

pub use config::AppConfig;
pub use error::WakaError;
pub use fetcher::SummaryFetcher;
pub use range::RangeSelector;
pub use types::{RawDaySummary, SummariesResponse};
