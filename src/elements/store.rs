use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use utoipa::ToSchema;

use super::error::ElementError;
use super::source::ElementSource;

/// Where a fetch result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FetchOrigin {
    /// Cache file was younger than the max age; no request made.
    Cache,
    Network,
    /// Request failed; served the cache file regardless of age.
    StaleCache,
    /// Request failed and no cache file exists.
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct Fetched {
    pub origin: FetchOrigin,
    pub text: String,
    /// When `text` was acquired from the source. Cache origins carry the file's mtime.
    pub at: DateTime<Utc>,
}

/// Disk-backed, rate-limited access to the element source.
pub struct ElementStore {
    source: Arc<dyn ElementSource>,
    cache_path: PathBuf,
    max_age: Duration,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl ElementStore {
    pub fn new(
        source: Arc<dyn ElementSource>,
        cache_path: PathBuf,
        max_age: Duration,
        min_interval: Duration,
    ) -> Self {
        Self {
            source,
            cache_path,
            max_age,
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Never fails: yields fresh text, stale cached text, or an empty string.
    pub async fn fetch(&self, url: &str) -> Fetched {
        if let Some(modified) = self.cache_modified().await {
            let age = SystemTime::now()
                .duration_since(modified)
                .unwrap_or_default();
            if age < self.max_age {
                match tokio::fs::read_to_string(&self.cache_path).await {
                    Ok(text) => {
                        log::info!(
                            "Using cached elements from {} (age {}s)",
                            self.cache_path.display(),
                            age.as_secs()
                        );
                        return fetched(FetchOrigin::Cache, text, modified.into());
                    }
                    Err(e) => log::warn!(
                        "Failed to read element cache {}: {}",
                        self.cache_path.display(),
                        e
                    ),
                }
            }
        }

        match self.request(url).await {
            Ok(text) => {
                if let Err(e) = self.persist(&text).await {
                    log::warn!(
                        "Failed to write element cache {}: {}",
                        self.cache_path.display(),
                        e
                    );
                }
                fetched(FetchOrigin::Network, text, Utc::now())
            }
            Err(e) => {
                log::warn!("Element fetch from {} failed: {}", url, e);
                match tokio::fs::read_to_string(&self.cache_path).await {
                    Ok(text) => {
                        let modified = self.cache_modified().await;
                        log::info!("Falling back to stale element cache");
                        let at = modified.map(DateTime::from).unwrap_or_else(Utc::now);
                        fetched(FetchOrigin::StaleCache, text, at)
                    }
                    Err(_) => {
                        log::warn!("No element cache available, continuing without elements");
                        fetched(FetchOrigin::Unavailable, String::new(), Utc::now())
                    }
                }
            }
        }
    }

    async fn request(&self, url: &str) -> Result<String, ElementError> {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                log::info!("Rate limiting element source, waiting {}ms", wait.as_millis());
                sleep(wait).await;
            }
        }
        *last = Some(Instant::now());

        log::info!("Fetching elements from {}", url);
        self.source.get(url).await
    }

    /// Modification time of the cache file, the only record of when its contents were acquired.
    async fn cache_modified(&self) -> Option<SystemTime> {
        let metadata = tokio::fs::metadata(&self.cache_path).await.ok()?;
        metadata.modified().ok()
    }

    async fn persist(&self, text: &str) -> Result<(), ElementError> {
        if let Some(parent) = self.cache_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.cache_path, text).await?;
        Ok(())
    }
}

fn fetched(origin: FetchOrigin, text: String, at: DateTime<Utc>) -> Fetched {
    Fetched { origin, text, at }
}
