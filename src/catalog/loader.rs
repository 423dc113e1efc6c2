use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::priority::{classify, priority, Category};
use crate::elements::OrbitalElementRecord;
use crate::geometry::{observe, Observation, ObserverLocation};
use crate::orbit::{OrbitHandle, OrbitPropagator, PropagationError};

const MIN_ALTITUDE_KM: f64 = 150.0;
const MAX_ALTITUDE_KM: f64 = 50_000.0;
const MAX_RANGE_KM: f64 = 50_000.0;

const PROGRESS_EVERY: usize = 100;

/// Sanity band shared by catalog filtering and read-time validation.
pub fn is_plausible(altitude_km: f64, range_km: f64) -> bool {
    altitude_km.is_finite()
        && range_km.is_finite()
        && (MIN_ALTITUDE_KM..=MAX_ALTITUDE_KM).contains(&altitude_km)
        && range_km <= MAX_RANGE_KM
}

/// A propagatable object in one catalog generation.
pub struct Orbit {
    pub record: OrbitalElementRecord,
    pub category: Category,
    handle: Arc<dyn OrbitHandle>,
}

impl Orbit {
    pub fn new(record: OrbitalElementRecord, handle: Arc<dyn OrbitHandle>) -> Self {
        Self {
            category: classify(&record.name),
            record,
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn observe(
        &self,
        timestamp: DateTime<Utc>,
        observer: &ObserverLocation,
    ) -> Result<Observation, PropagationError> {
        observe(self.handle.as_ref(), timestamp, observer)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LoadReport {
    pub candidates: usize,
    pub loaded: usize,
    pub failed: usize,
    pub filtered: usize,
    /// Later records sharing a name with an already loaded orbit.
    pub duplicates: usize,
    pub skipped_over_cap: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub processed: usize,
    pub total: usize,
    pub loaded: usize,
}

/// One immutable generation of loaded orbits.
#[derive(Default)]
pub struct Catalog {
    pub orbits: HashMap<String, Arc<Orbit>>,
    pub loaded_at: Option<DateTime<Utc>>,
    /// Acquisition time of the oldest element record this generation was built from.
    pub elements_fetched_at: Option<DateTime<Utc>>,
    pub report: LoadReport,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orbits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orbits.is_empty()
    }
}

type ProgressFn = Box<dyn Fn(LoadProgress) + Send + Sync>;

pub struct CatalogLoader {
    propagator: Arc<dyn OrbitPropagator>,
    observer: ObserverLocation,
    max_objects: usize,
    progress: Option<ProgressFn>,
}

impl CatalogLoader {
    pub fn new(
        propagator: Arc<dyn OrbitPropagator>,
        observer: ObserverLocation,
        max_objects: usize,
    ) -> Self {
        Self {
            propagator,
            observer,
            max_objects,
            progress: None,
        }
    }

    pub fn with_progress(
        mut self,
        progress: impl Fn(LoadProgress) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Build a new catalog generation from parsed records.
    pub fn load(&self, mut records: Vec<OrbitalElementRecord>, now: DateTime<Utc>) -> Catalog {
        // Stable: source order is kept within a priority class.
        records.sort_by_key(|r| priority(&r.name));
        let elements_fetched_at = records.iter().map(|r| r.fetched_at).min();

        let mut report = LoadReport {
            candidates: records.len(),
            skipped_over_cap: records.len().saturating_sub(self.max_objects),
            ..LoadReport::default()
        };
        records.truncate(self.max_objects);

        let total = records.len();
        let mut orbits = HashMap::with_capacity(total);

        for (i, record) in records.into_iter().enumerate() {
            match self.admit(record, now) {
                Ok(Some(orbit)) => {
                    if orbits.contains_key(orbit.name()) {
                        log::debug!("Skipping duplicate record for {}", orbit.name());
                        report.duplicates += 1;
                    } else {
                        orbits.insert(orbit.name().to_string(), Arc::new(orbit));
                    }
                }
                Ok(None) => report.filtered += 1,
                Err((name, e)) => {
                    log::debug!("Dropping {}: {}", name, e);
                    report.failed += 1;
                }
            }

            let processed = i + 1;
            if processed % PROGRESS_EVERY == 0 || processed == total {
                self.report_progress(LoadProgress {
                    processed,
                    total,
                    loaded: orbits.len(),
                });
            }
        }

        report.loaded = orbits.len();
        log::info!(
            "Catalog loaded {} of {} ({} failed, {} filtered, {} duplicate, {} over cap)",
            report.loaded,
            report.candidates,
            report.failed,
            report.filtered,
            report.duplicates,
            report.skipped_over_cap
        );

        Catalog {
            orbits,
            loaded_at: Some(now),
            elements_fetched_at,
            report,
        }
    }

    /// Build and coarse-check one candidate. `Ok(None)` means filtered out.
    fn admit(
        &self,
        record: OrbitalElementRecord,
        now: DateTime<Utc>,
    ) -> Result<Option<Orbit>, (String, PropagationError)> {
        let handle = match self.propagator.build(&record) {
            Ok(h) => h,
            Err(e) => return Err((record.name, e)),
        };
        let orbit = Orbit::new(record, handle);

        let observation = match orbit.observe(now, &self.observer) {
            Ok(o) => o,
            Err(e) => return Err((orbit.record.name, e)),
        };

        if !is_plausible(observation.altitude_km, observation.look.range_km) {
            log::debug!(
                "Filtering {}: altitude {:.0} km, range {:.0} km",
                orbit.name(),
                observation.altitude_km,
                observation.look.range_km
            );
            return Ok(None);
        }

        Ok(Some(orbit))
    }

    fn report_progress(&self, progress: LoadProgress) {
        if let Some(callback) = &self.progress {
            callback(progress);
        }
    }
}
