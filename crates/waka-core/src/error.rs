use thiserror::Error;

/// Maximum number of upstream body characters kept for diagnostics.
pub const UPSTREAM_BODY_LIMIT: usize = 200;

#[derive(Error, Debug)]
pub enum WakaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "Upstream error ({}): {body}",
        .status.map_or_else(|| "no response".to_string(), |s| s.to_string())
    )]
    Upstream { status: Option<u16>, body: String },

    #[error("Cancelled by caller")]
    Cancelled,
}

impl WakaError {
    /// Build an upstream error, keeping at most `UPSTREAM_BODY_LIMIT` characters of `body`.
    pub fn upstream(status: Option<u16>, body: impl AsRef<str>) -> Self {
        Self::Upstream {
            status,
            body: truncate_chars(body.as_ref(), UPSTREAM_BODY_LIMIT),
        }
    }

    /// Status code an HTTP adapter should answer with.
    ///
    /// `Cancelled` maps to 499 (client closed request); it is only ever
    /// logged, since nobody is left to read the response.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Config(_) => 500,
            Self::Upstream { .. } => 502,
            Self::Cancelled => 499,
        }
    }

    /// Upstream status code, when the upstream answered at all.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, WakaError>;
