use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::geometry::ObserverLocation;

const DEFAULT_SOURCE_URL: &str =
    "https://celestrak.org/NORAD/elements/gp.php?GROUP=active&FORMAT=tle";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub observer: ObserverConfig,
    #[serde(default)]
    pub elements: ElementsConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub trajectory: TrajectoryConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObserverConfig {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub altitude_km: f64,
}

impl ObserverConfig {
    pub fn location(&self) -> ObserverLocation {
        ObserverLocation::new(self.latitude_deg, self.longitude_deg, self.altitude_km)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementsConfig {
    #[serde(default = "default_source_url")]
    pub source_url: String,
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
    #[serde(default = "default_cache_max_age", deserialize_with = "deserialize_duration")]
    pub cache_max_age: Duration,
    #[serde(
        default = "default_min_request_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub min_request_interval: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout", deserialize_with = "deserialize_duration")]
    pub request_timeout: Duration,
}

impl Default for ElementsConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            cache_path: default_cache_path(),
            cache_max_age: default_cache_max_age(),
            min_request_interval: default_min_request_interval(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("data/active.tle")
}

fn default_cache_max_age() -> Duration {
    Duration::from_secs(3 * 3600)
}

fn default_min_request_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("sky-cache/{} (satellite visibility cache)", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_max_objects")]
    pub max_objects: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_objects: default_max_objects(),
        }
    }
}

fn default_max_objects() -> usize {
    500
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrajectoryConfig {
    #[serde(default = "default_min_elevation")]
    pub min_elevation_deg: f64,
    #[serde(default = "default_lookahead", deserialize_with = "deserialize_duration")]
    pub lookahead: Duration,
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            min_elevation_deg: default_min_elevation(),
            lookahead: default_lookahead(),
            sample_count: default_sample_count(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_min_elevation() -> f64 {
    10.0
}

fn default_lookahead() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_sample_count() -> usize {
    20
}

fn default_batch_size() -> usize {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_catalog_interval", deserialize_with = "deserialize_duration")]
    pub catalog_interval: Duration,
    #[serde(
        default = "default_precompute_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub precompute_interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            catalog_interval: default_catalog_interval(),
            precompute_interval: default_precompute_interval(),
        }
    }
}

fn default_catalog_interval() -> Duration {
    Duration::from_secs(6 * 3600)
}

fn default_precompute_interval() -> Duration {
    Duration::from_secs(2 * 60)
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_display_max")]
    pub display_max: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            display_max: default_display_max(),
        }
    }
}

fn default_display_max() -> usize {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if !(-90.0..=90.0).contains(&self.observer.latitude_deg) {
            return invalid("observer.latitude_deg must be within [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&self.observer.longitude_deg) {
            return invalid("observer.longitude_deg must be within [-180, 180]");
        }
        if self.trajectory.sample_count < 2 {
            return invalid("trajectory.sample_count must be at least 2");
        }
        if self.trajectory.lookahead.is_zero() {
            return invalid("trajectory.lookahead must be positive");
        }
        if self.trajectory.batch_size == 0 {
            return invalid("trajectory.batch_size must be positive");
        }
        if self.catalog.max_objects == 0 {
            return invalid("catalog.max_objects must be positive");
        }
        if self.query.display_max == 0 {
            return invalid("query.display_max must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_str(
            "observer:\n  latitude_deg: 52.0\n  longitude_deg: 4.4\n",
        )
        .unwrap();

        assert_eq!(config.observer.altitude_km, 0.0);
        assert_eq!(config.elements.cache_max_age, Duration::from_secs(3 * 3600));
        assert_eq!(config.elements.min_request_interval, Duration::from_secs(30));
        assert_eq!(config.catalog.max_objects, 500);
        assert_eq!(config.trajectory.sample_count, 20);
        assert_eq!(config.trajectory.lookahead, Duration::from_secs(300));
        assert_eq!(config.query.display_max, 50);
        assert_eq!(config.web.bind, "0.0.0.0:8080");
    }

    #[test]
    fn durations_are_human_readable() {
        let yaml = r#"
observer:
  latitude_deg: 40.0
  longitude_deg: -3.7
  altitude_km: 0.65
elements:
  cache_max_age: 90m
  min_request_interval: 5s
refresh:
  catalog_interval: 12h
  precompute_interval: 1m 30s
"#;
        let config = Config::from_str(yaml).unwrap();
        assert_eq!(config.elements.cache_max_age, Duration::from_secs(90 * 60));
        assert_eq!(config.elements.min_request_interval, Duration::from_secs(5));
        assert_eq!(config.refresh.catalog_interval, Duration::from_secs(12 * 3600));
        assert_eq!(config.refresh.precompute_interval, Duration::from_secs(90));
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let err = Config::from_str("observer:\n  latitude_deg: 91.0\n  longitude_deg: 0.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_single_sample_trajectory() {
        let yaml = r#"
observer:
  latitude_deg: 0.0
  longitude_deg: 0.0
trajectory:
  sample_count: 1
"#;
        assert!(matches!(
            Config::from_str(yaml).unwrap_err(),
            ConfigError::Invalid(_)
        ));
    }

    #[test]
    fn rejects_garbage_duration() {
        let yaml = r#"
observer:
  latitude_deg: 0.0
  longitude_deg: 0.0
elements:
  cache_max_age: soon
"#;
        assert!(matches!(Config::from_str(yaml).unwrap_err(), ConfigError::Yaml(_)));
    }
}
