use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use super::types::{ServiceStatus, VisibleSummary};
use crate::catalog::{is_plausible, Catalog, CatalogLoader, LoadReport};
use crate::elements::{parse_elements, ElementStore, FetchOrigin};
use crate::geometry::orbital_speed_km_s;
use crate::precompute::{PrecomputedTrack, Precomputer, VisibilitySnapshot};

const DURATION_HISTORY: usize = 10;

#[derive(Debug, Default)]
struct Stats {
    last_fetch_at: Option<DateTime<Utc>>,
    last_fetch_origin: Option<FetchOrigin>,
    snapshot_published_at: Option<DateTime<Utc>>,
    last_pass_processed: usize,
    last_pass_discarded: usize,
    precompute_durations: VecDeque<Duration>,
}

impl Stats {
    fn record_pass(&mut self, elapsed: Duration, processed: usize, discarded: usize) {
        if self.precompute_durations.len() == DURATION_HISTORY {
            self.precompute_durations.pop_front();
        }
        self.precompute_durations.push_back(elapsed);
        self.last_pass_processed = processed;
        self.last_pass_discarded = discarded;
    }

    fn avg_precompute_ms(&self) -> Option<f64> {
        if self.precompute_durations.is_empty() {
            return None;
        }
        let total: f64 = self
            .precompute_durations
            .iter()
            .map(|d| d.as_secs_f64() * 1000.0)
            .sum();
        Some(total / self.precompute_durations.len() as f64)
    }
}

/// State shared by the refresh loops and every reader.
///
/// `catalog` and `snapshot` guards are only ever held for an `Arc` clone or
/// assignment.
pub(super) struct Shared {
    source_url: String,
    display_max: usize,
    store: ElementStore,
    loader: CatalogLoader,
    precomputer: Precomputer,
    catalog: RwLock<Arc<Catalog>>,
    snapshot: RwLock<Arc<VisibilitySnapshot>>,
    stats: Mutex<Stats>,
    pub(super) running: AtomicBool,
    pub(super) precompute_requested: Notify,
}

impl Shared {
    pub(super) fn new(
        source_url: String,
        display_max: usize,
        store: ElementStore,
        loader: CatalogLoader,
        precomputer: Precomputer,
    ) -> Self {
        Self {
            source_url,
            display_max,
            store,
            loader,
            precomputer,
            catalog: RwLock::new(Arc::new(Catalog::empty())),
            snapshot: RwLock::new(Arc::new(VisibilitySnapshot::default())),
            stats: Mutex::new(Stats::default()),
            running: AtomicBool::new(false),
            precompute_requested: Notify::new(),
        }
    }

    pub(super) fn catalog(&self) -> Arc<Catalog> {
        self.catalog.read().unwrap().clone()
    }

    pub(super) fn snapshot(&self) -> Arc<VisibilitySnapshot> {
        self.snapshot.read().unwrap().clone()
    }

    /// Fetch, parse and load a new catalog generation.
    pub(super) async fn refresh_catalog(&self) -> LoadReport {
        let fetched = self.store.fetch(&self.source_url).await;
        {
            let mut stats = self.stats.lock().unwrap();
            stats.last_fetch_at = Some(fetched.at);
            stats.last_fetch_origin = Some(fetched.origin);
        }

        if fetched.origin == FetchOrigin::Unavailable && !self.catalog().is_empty() {
            log::warn!("No element data available, keeping previous catalog");
            return self.catalog().report;
        }

        let records = parse_elements(&fetched.text, fetched.at);
        log::info!("Parsed {} element records ({:?})", records.len(), fetched.origin);

        let catalog = self.loader.load(records, Utc::now());
        let report = catalog.report;
        *self.catalog.write().unwrap() = Arc::new(catalog);
        report
    }

    /// Run a full pass against the current catalog and publish the result.
    pub(super) async fn precompute(&self) -> usize {
        let catalog = self.catalog();
        let report = self.precomputer.run(catalog, Utc::now()).await;

        let visible = report.snapshot.len();
        let published_at = report.snapshot.generated_at;
        *self.snapshot.write().unwrap() = Arc::new(report.snapshot);

        let mut stats = self.stats.lock().unwrap();
        stats.snapshot_published_at = published_at;
        stats.record_pass(report.elapsed, report.processed, report.discarded);
        visible
    }
}

/// Read-only, non-blocking access to published state.
#[derive(Clone)]
pub struct SkyQuery {
    shared: Arc<Shared>,
}

impl SkyQuery {
    pub(super) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Published objects at their nearest-to-now sample, highest first.
    pub fn visible_now(&self) -> Vec<VisibleSummary> {
        visible_in(&self.shared.snapshot(), self.shared.display_max)
    }

    pub fn track(&self, name: &str) -> Option<PrecomputedTrack> {
        self.shared.snapshot().tracks.get(name).cloned()
    }

    pub fn snapshot(&self) -> Arc<VisibilitySnapshot> {
        self.shared.snapshot()
    }

    pub fn status(&self) -> ServiceStatus {
        let catalog = self.shared.catalog();
        let snapshot = self.shared.snapshot();
        let published_visible = visible_in(&snapshot, self.shared.display_max).len();
        let stats = self.shared.stats.lock().unwrap();

        ServiceStatus {
            running: self.shared.running.load(Ordering::SeqCst),
            loaded: catalog.len(),
            cached_visible: snapshot.len(),
            published_visible,
            last_fetch_at: stats.last_fetch_at,
            last_fetch_origin: stats.last_fetch_origin,
            catalog_loaded_at: catalog.loaded_at,
            snapshot_published_at: stats.snapshot_published_at,
            elements_fetched_at: catalog.elements_fetched_at,
            last_load: catalog.report,
            last_pass_processed: stats.last_pass_processed,
            last_pass_discarded: stats.last_pass_discarded,
            avg_precompute_ms: stats.avg_precompute_ms().map(round2),
        }
    }
}

fn visible_in(snapshot: &VisibilitySnapshot, display_max: usize) -> Vec<VisibleSummary> {
    let mut visible: Vec<VisibleSummary> =
        snapshot.tracks.values().filter_map(summarize).collect();
    visible.sort_by(|a, b| b.elevation_deg.total_cmp(&a.elevation_deg));
    visible.truncate(display_max);
    visible
}

fn summarize(track: &PrecomputedTrack) -> Option<VisibleSummary> {
    let first = track.first_sample()?;
    if !first.elevation_deg.is_finite() || !is_plausible(first.altitude_km, first.range_km) {
        log::debug!("Dropping implausible published track {}", track.name);
        return None;
    }

    Some(VisibleSummary {
        name: track.name.clone(),
        norad_id: track.norad_id,
        category: track.category,
        timestamp: first.timestamp,
        azimuth_deg: round2(first.azimuth_deg),
        elevation_deg: round2(first.elevation_deg),
        range_km: round2(first.range_km),
        altitude_km: round2(first.altitude_km),
        velocity_km_s: round2(orbital_speed_km_s(first.altitude_km)),
        peak_elevation_deg: round2(track.peak_elevation_deg),
        trajectory: track.samples.clone(),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
