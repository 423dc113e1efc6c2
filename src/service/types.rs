use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::{Category, LoadReport};
use crate::elements::FetchOrigin;
use crate::precompute::TrajectorySample;

/// Nearest-to-now view of one published track.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VisibleSummary {
    pub name: String,
    pub norad_id: Option<u32>,
    pub category: Category,
    pub timestamp: DateTime<Utc>,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
    pub altitude_km: f64,
    pub velocity_km_s: f64,
    pub peak_elevation_deg: f64,
    pub trajectory: Vec<TrajectorySample>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServiceStatus {
    pub running: bool,
    pub loaded: usize,
    pub cached_visible: usize,
    pub published_visible: usize,
    pub last_fetch_at: Option<DateTime<Utc>>,
    pub last_fetch_origin: Option<FetchOrigin>,
    pub catalog_loaded_at: Option<DateTime<Utc>>,
    /// Acquisition time of the elements behind the current catalog.
    pub elements_fetched_at: Option<DateTime<Utc>>,
    pub snapshot_published_at: Option<DateTime<Utc>>,
    pub last_load: LoadReport,
    /// Orbits sampled by the most recent precomputation pass.
    pub last_pass_processed: usize,
    /// Orbits in that pass without a single valid sample.
    pub last_pass_discarded: usize,
    pub avg_precompute_ms: Option<f64>,
}
