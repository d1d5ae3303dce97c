use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
const DEFAULT_MAP_STYLE_URL: &str = "https://basemaps.cartocdn.com/gl/positron-gl-style/style.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_DEDUPE_INTERVAL_SECS: u64 = 5 * 60;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppProfile {
    Dev,
    Prod,
}

impl AppProfile {
    pub fn from_env(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("prod") | Some("production") => Self::Prod,
            _ => Self::Dev,
        }
    }

    pub fn log_level(self) -> tracing::Level {
        match self {
            Self::Dev => tracing::Level::DEBUG,
            Self::Prod => tracing::Level::INFO,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    pub map_style_url: String,
    pub profile: AppProfile,
    pub request_timeout: Duration,
    /// Window during which repeated loads of one endpoint share a single request.
    pub dedupe_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            map_style_url: DEFAULT_MAP_STYLE_URL.to_string(),
            profile: AppProfile::Dev,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            dedupe_interval: Duration::from_secs(DEFAULT_DEDUPE_INTERVAL_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        crate::config::load_dotenv();

        Self::from_lookup(read_env)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("KPI_API_BASE_URL").filter(|value| !value.trim().is_empty()) {
            config.api_base_url = url;
        }

        if let Some(style) = lookup("KPI_MAPLIBRE_STYLE").filter(|value| !value.trim().is_empty())
        {
            config.map_style_url = style;
        }

        config.profile = AppProfile::from_env(lookup("KPI_PROFILE"));

        if let Some(secs) =
            lookup("KPI_REQUEST_TIMEOUT_SECS").and_then(|value| value.parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(secs) =
            lookup("KPI_DEDUPE_INTERVAL_SECS").and_then(|value| value.parse::<u64>().ok())
        {
            config.dedupe_interval = Duration::from_secs(secs.max(1));
        }

        config
    }

    /// Scheme and host of the API, without the versioned path prefix.
    pub fn api_origin(&self) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        let after_scheme = base.find("://").map(|idx| idx + 3).unwrap_or(0);
        match base[after_scheme..].find('/') {
            Some(slash) => base[..after_scheme + slash].to_string(),
            None => base.to_string(),
        }
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .or_else(|| option_env_from_build(key).map(|s| s.to_string()))
}

fn option_env_from_build(key: &str) -> Option<&'static str> {
    match key {
        "KPI_API_BASE_URL" => option_env!("KPI_API_BASE_URL"),
        "KPI_MAPLIBRE_STYLE" => option_env!("KPI_MAPLIBRE_STYLE"),
        "KPI_PROFILE" => option_env!("KPI_PROFILE"),
        "KPI_REQUEST_TIMEOUT_SECS" => option_env!("KPI_REQUEST_TIMEOUT_SECS"),
        "KPI_DEDUPE_INTERVAL_SECS" => option_env!("KPI_DEDUPE_INTERVAL_SECS"),
        _ => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            tracing::warn!("failed to load .env: {err}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[inline]
pub fn load_dotenv() {}
