use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use page_logging::page_info;
use portfolio_core::{FragmentName, InvalidFragmentName, DEFAULT_MANIFEST};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::{AnalyticsNames, DEFAULT_DEFERRED_LIMIT};
use crate::fetch::{FetchSettings, FragmentSource};
use crate::FetchError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid manifest entry: {0}")]
    Manifest(#[from] InvalidFragmentName),
    #[error("invalid base url: {0}")]
    BaseUrl(FetchError),
}

/// Transport limits as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            connect_timeout_ms: duration_ms(settings.connect_timeout),
            request_timeout_ms: duration_ms(settings.request_timeout),
            redirect_limit: settings.redirect_limit,
            max_bytes: settings.max_bytes,
        }
    }
}

impl FetchConfig {
    pub fn to_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            ..FetchSettings::default()
        }
    }
}

/// Site configuration, read from RON. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub manifest: Vec<String>,
    pub cache_bust: Option<String>,
    pub fetch: FetchConfig,
    pub feature_init_delay_ms: u64,
    pub analytics: AnalyticsNames,
    pub deferred_event_limit: usize,
    pub preferences_path: Option<PathBuf>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            manifest: DEFAULT_MANIFEST.iter().map(|name| name.to_string()).collect(),
            cache_bust: None,
            fetch: FetchConfig::default(),
            feature_init_delay_ms: 500,
            analytics: AnalyticsNames::default(),
            deferred_event_limit: DEFAULT_DEFERRED_LIMIT,
            preferences_path: None,
        }
    }
}

impl SiteConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn manifest_names(&self) -> Result<Vec<FragmentName>, ConfigError> {
        Ok(FragmentName::parse_manifest(&self.manifest)?)
    }

    pub fn source(&self) -> Result<FragmentSource, ConfigError> {
        FragmentSource::new(&self.base_url, self.cache_bust.clone()).map_err(ConfigError::BaseUrl)
    }

    pub fn feature_init_delay(&self) -> Duration {
        Duration::from_millis(self.feature_init_delay_ms)
    }
}

/// Reads a config file; `None` yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(SiteConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = SiteConfig::from_ron(&text)?;
    page_info!("Loaded site config from {:?}", path);
    Ok(config)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
