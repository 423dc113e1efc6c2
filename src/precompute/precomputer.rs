use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use chrono::{DateTime, Duration, Utc};

use super::types::{PrecomputedTrack, TrajectorySample, VisibilitySnapshot};
use crate::catalog::{Catalog, Orbit};
use crate::config::TrajectoryConfig;
use crate::geometry::ObserverLocation;

const DEFAULT_LOOKAHEAD: Duration = Duration::minutes(5);

/// Result of one full precomputation pass.
#[derive(Debug)]
pub struct PassReport {
    pub snapshot: VisibilitySnapshot,
    pub elapsed: StdDuration,
    pub processed: usize,
    /// Orbits without a single valid sample.
    pub discarded: usize,
}

pub struct Precomputer {
    observer: ObserverLocation,
    min_elevation_deg: f64,
    lookahead: Duration,
    sample_count: usize,
    batch_size: usize,
}

impl Precomputer {
    pub fn new(observer: ObserverLocation, config: &TrajectoryConfig) -> Self {
        Self {
            observer,
            min_elevation_deg: config.min_elevation_deg,
            lookahead: Duration::from_std(config.lookahead).unwrap_or(DEFAULT_LOOKAHEAD),
            sample_count: config.sample_count.max(2),
            batch_size: config.batch_size.max(1),
        }
    }

    /// `sample_count` instants from `start` to `start + lookahead`, inclusive.
    pub fn sample_times(&self, start: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let span_ms = self.lookahead.num_milliseconds();
        let intervals = self.sample_count as i64 - 1;
        (0..self.sample_count as i64)
            .map(|i| start + Duration::milliseconds(span_ms * i / intervals))
            .collect()
    }

    /// Sample one orbit over the window. `None` if no sample propagated.
    pub fn compute_track(&self, orbit: &Orbit, start: DateTime<Utc>) -> Option<PrecomputedTrack> {
        let mut samples = Vec::with_capacity(self.sample_count);

        for timestamp in self.sample_times(start) {
            let observation = match orbit.observe(timestamp, &self.observer) {
                Ok(o) => o,
                Err(e) => {
                    log::debug!("Sample for {} at {} dropped: {}", orbit.name(), timestamp, e);
                    continue;
                }
            };

            samples.push(TrajectorySample {
                timestamp,
                azimuth_deg: observation.look.azimuth_deg,
                elevation_deg: observation.look.elevation_deg,
                range_km: observation.look.range_km,
                altitude_km: observation.altitude_km,
                speed_km_s: observation.speed_km_s,
                above_min_elevation: observation.look.elevation_deg >= self.min_elevation_deg,
            });
        }

        if samples.is_empty() {
            return None;
        }

        let will_be_visible = samples.iter().any(|s| s.above_min_elevation);
        let peak_elevation_deg = samples
            .iter()
            .map(|s| s.elevation_deg)
            .fold(f64::NEG_INFINITY, f64::max);

        Some(PrecomputedTrack {
            name: orbit.name().to_string(),
            norad_id: orbit.record.norad_id,
            category: orbit.category,
            samples,
            will_be_visible,
            peak_elevation_deg,
        })
    }

    /// Build a complete snapshot from one catalog generation.
    ///
    /// Yields to the runtime between batches; the caller publishes the
    /// snapshot only once this returns.
    pub async fn run(&self, catalog: Arc<Catalog>, start: DateTime<Utc>) -> PassReport {
        let started = Instant::now();
        let orbits: Vec<Arc<Orbit>> = catalog.orbits.values().cloned().collect();

        let mut snapshot = VisibilitySnapshot {
            tracks: Default::default(),
            generated_at: Some(start),
        };
        let mut discarded = 0;

        for (i, batch) in orbits.chunks(self.batch_size).enumerate() {
            if i > 0 {
                tokio::task::yield_now().await;
            }

            for orbit in batch {
                match self.compute_track(orbit, start) {
                    Some(track) if track.will_be_visible => {
                        snapshot.tracks.insert(track.name.clone(), track);
                    }
                    Some(_) => {}
                    None => {
                        log::debug!("No valid samples for {}", orbit.name());
                        discarded += 1;
                    }
                }
            }
        }

        let elapsed = started.elapsed();
        log::info!(
            "Precomputed {} orbits in {}ms: {} visible, {} discarded",
            orbits.len(),
            elapsed.as_millis(),
            snapshot.len(),
            discarded
        );

        PassReport {
            snapshot,
            elapsed,
            processed: orbits.len(),
            discarded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::testing::{point_at, records, FixedEcefOrbit, ScriptedOrbit};
    use crate::orbit::OrbitHandle;
    use chrono::TimeZone;

    fn observer() -> ObserverLocation {
        ObserverLocation::new(40.4, -3.7, 0.65)
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 21, 0, 0).unwrap()
    }

    fn precomputer(batch_size: usize) -> Precomputer {
        Precomputer::new(
            observer(),
            &TrajectoryConfig {
                min_elevation_deg: 10.0,
                lookahead: StdDuration::from_secs(300),
                sample_count: 20,
                batch_size,
            },
        )
    }

    fn orbit(name: &str, handle: impl OrbitHandle + 'static) -> Arc<Orbit> {
        let record = records(&[name]).remove(0);
        Arc::new(Orbit::new(record, Arc::new(handle)))
    }

    /// Elevation sweeps linearly from `from` to `to` over the window.
    fn sweep(from: f64, to: f64) -> impl OrbitHandle {
        let obs = observer();
        let t0 = start();
        ScriptedOrbit::new(move |t: DateTime<Utc>| {
            let frac = ((t - t0).num_milliseconds() as f64 / 300_000.0).clamp(0.0, 1.0);
            Some(point_at(&obs, 180.0, from + (to - from) * frac, 2000.0))
        })
    }

    fn catalog(orbits: Vec<Arc<Orbit>>) -> Arc<Catalog> {
        Arc::new(Catalog {
            orbits: orbits
                .into_iter()
                .map(|o| (o.name().to_string(), o))
                .collect(),
            loaded_at: Some(start()),
            elements_fetched_at: None,
            report: Default::default(),
        })
    }

    #[test]
    fn samples_span_the_window_in_order() {
        let times = precomputer(10).sample_times(start());
        assert_eq!(times.len(), 20);
        assert_eq!(times[0], start());
        assert_eq!(times[19], start() + Duration::minutes(5));
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn overhead_object_is_visible_with_peak_near_zenith() {
        let o = orbit("ISS (ZARYA)", FixedEcefOrbit::new(point_at(&observer(), 0.0, 90.0, 420.0)));
        let track = precomputer(10).compute_track(&o, start()).unwrap();

        assert_eq!(track.samples.len(), 20);
        assert!(track.will_be_visible);
        assert!(track.samples.iter().all(|s| s.above_min_elevation));
        assert!((track.peak_elevation_deg - 90.0).abs() < 1e-4);
        assert_eq!(track.norad_id, Some(10_000));
    }

    #[test]
    fn rising_object_crosses_minimum_elevation() {
        let o = orbit("NOAA 19", sweep(-5.0, 40.0));
        let track = precomputer(10).compute_track(&o, start()).unwrap();

        assert!(track.will_be_visible);
        assert!(!track.samples[0].above_min_elevation);
        assert!(track.samples[19].above_min_elevation);
        assert!((track.peak_elevation_deg - 40.0).abs() < 1e-3);
        assert!(track
            .samples
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn failed_samples_are_skipped() {
        let obs = observer();
        let half = start() + Duration::seconds(150);
        let o = orbit(
            "FLAKY",
            ScriptedOrbit::new(move |t| (t >= half).then(|| point_at(&obs, 90.0, 45.0, 900.0))),
        );

        let track = precomputer(10).compute_track(&o, start()).unwrap();
        assert_eq!(track.samples.len(), 10);
        assert!(track.samples.iter().all(|s| s.timestamp >= half));
    }

    #[test]
    fn track_without_samples_is_discarded() {
        let o = orbit("DEAD", ScriptedOrbit::new(|_| None));
        assert!(precomputer(10).compute_track(&o, start()).is_none());
    }

    #[tokio::test]
    async fn pass_keeps_only_visible_tracks() {
        let obs = observer();
        let mut orbits = vec![
            orbit("UP", FixedEcefOrbit::new(point_at(&obs, 10.0, 60.0, 800.0))),
            orbit("LOW", FixedEcefOrbit::new(point_at(&obs, 10.0, 5.0, 2000.0))),
            orbit("RISING", sweep(-5.0, 30.0)),
            orbit("DEAD", ScriptedOrbit::new(|_| None)),
        ];
        for i in 0..5 {
            orbits.push(orbit(
                &format!("BELOW {i}"),
                FixedEcefOrbit::new(point_at(&obs, 72.0 * i as f64, -20.0, 10_000.0)),
            ));
        }

        let report = precomputer(3).run(catalog(orbits), start()).await;

        let mut names: Vec<_> = report.snapshot.tracks.keys().cloned().collect();
        names.sort();
        assert_eq!(names, vec!["RISING", "UP"]);
        assert_eq!(report.processed, 9);
        assert_eq!(report.discarded, 1);
        assert_eq!(report.snapshot.generated_at, Some(start()));
        assert!(report.snapshot.tracks.values().all(|t| t.will_be_visible));
    }

    #[tokio::test]
    async fn empty_catalog_yields_empty_snapshot() {
        let report = precomputer(3).run(Arc::new(Catalog::empty()), start()).await;
        assert!(report.snapshot.is_empty());
        assert_eq!(report.processed, 0);
    }
}
