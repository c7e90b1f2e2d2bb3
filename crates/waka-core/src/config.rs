use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable holding the WakaTime API key.
pub const API_KEY_ENV: &str = "WAKATIME_API_KEY";
/// Environment variable overriding the upstream API base URL.
pub const API_BASE_ENV: &str = "WAKATIME_API_BASE";

/// Top-level application configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub wakatime: WakaTimeConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from default path (~/.config/waka-proxy/config.toml),
    /// falling back to defaults if the file doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write current configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("waka-proxy")
            .join("config.toml")
    }

    /// Override credentials from the process environment.
    ///
    /// Only the binary calls this; library components take their
    /// configuration as constructed.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(API_BASE_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, api_key: Option<String>, api_base: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.wakatime.api_key = Some(key);
        }
        if let Some(base) = api_base.filter(|b| !b.trim().is_empty()) {
            self.wakatime.api_base = base;
        }
    }

    /// Copy of this config that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.wakatime.api_key.is_some() {
            copy.wakatime.api_key = Some("<redacted>".into());
        }
        copy
    }
}

/// Upstream summaries API configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WakaTimeConfig {
    /// Secret API key, sent as the Basic auth username.
    pub api_key: Option<String>,
    /// Base URL of the summaries API.
    pub api_base: String,
    /// Range used when a caller does not supply one.
    pub default_range: String,
}

impl Default for WakaTimeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://wakatime.com/api/v1".into(),
            default_range: "last_7_days".into(),
        }
    }
}

impl WakaTimeConfig {
    /// The API key, if one is set and not blank.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl fmt::Debug for WakaTimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WakaTimeConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("default_range", &self.default_range)
            .finish()
    }
}

/// HTTP proxy server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Port.
    pub port: u16,
    /// Allow cross-origin reads.
    pub cors: bool,
    /// Cache lifetime advertised to browsers and CDNs.
    pub cache_max_age_secs: u64,
    /// Wall-clock limit for one upstream fetch (None = wait indefinitely).
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8787,
            cors: true,
            cache_max_age_secs: 600,
            request_timeout_secs: Some(15),
        }
    }
}
