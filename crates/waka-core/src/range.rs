//! Reporting-window selectors understood by the summaries API.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A reporting window. Named presets map to the upstream `range` values;
/// anything else is passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RangeSelector {
    Today,
    Yesterday,
    #[default]
    Last7Days,
    Last7DaysFromYesterday,
    Last14Days,
    Last30Days,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    Custom(String),
}

impl RangeSelector {
    /// Value sent as the `range` query parameter.
    pub fn as_query(&self) -> &str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::Last7Days => "last_7_days",
            Self::Last7DaysFromYesterday => "last_7_days_from_yesterday",
            Self::Last14Days => "last_14_days",
            Self::Last30Days => "last_30_days",
            Self::ThisWeek => "this_week",
            Self::LastWeek => "last_week",
            Self::ThisMonth => "this_month",
            Self::LastMonth => "last_month",
            Self::Custom(raw) => raw,
        }
    }

    /// Parse an optional caller-supplied selector, defaulting when absent or blank.
    pub fn from_optional(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::default();
        }

        let key: String = trimmed
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match key.as_str() {
            "today" => Self::Today,
            "yesterday" => Self::Yesterday,
            "last_7_days" => Self::Last7Days,
            "last_7_days_from_yesterday" => Self::Last7DaysFromYesterday,
            "last_14_days" => Self::Last14Days,
            "last_30_days" => Self::Last30Days,
            "this_week" => Self::ThisWeek,
            "last_week" => Self::LastWeek,
            "this_month" => Self::ThisMonth,
            "last_month" => Self::LastMonth,
            _ => Self::Custom(raw.to_string()),
        }
    }
}

impl FromStr for RangeSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for RangeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}
