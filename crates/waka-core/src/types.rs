//! Upstream payload types for the summaries endpoint.
//!
//! Every field is optional on the wire. Missing or malformed values fall
//! back to empty/zero instead of failing the whole response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Envelope returned by `GET /users/current/summaries`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummariesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<RawDaySummary>,
}

/// One calendar day of tracked activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDaySummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<RawEntity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub editors: Vec<RawEntity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<RawEntity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub grand_total: GrandTotal,
    #[serde(default)]
    pub range: Option<DayRange>,
}

/// A named bucket's time for one day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub total_seconds: f64,
}

impl RawEntity {
    pub fn new(name: impl Into<String>, total_seconds: f64) -> Self {
        Self {
            name: Some(name.into()),
            total_seconds,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrandTotal {
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub total_seconds: f64,
}

/// The upstream's own description of the window a day covers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayRange {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Seconds from a number or numeric string, fractions kept.
/// Anything negative, non-finite or non-numeric counts as zero.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let secs = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if secs.is_finite() && secs > 0.0 { secs } else { 0.0 })
}

fn lenient_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
