//! Synthetic orbits for tests: objects pinned to Earth-fixed points,
//! converted back into TEME so the full transform chain is exercised.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{OrbitHandle, OrbitPropagator, PropagationError, StateVector};
use crate::elements::OrbitalElementRecord;
use crate::geometry::{gmst_rad, ObserverLocation};

const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;

/// Earth-fixed point seen from `observer` at the given azimuth/elevation/range.
pub fn point_at(observer: &ObserverLocation, az_deg: f64, el_deg: f64, range_km: f64) -> [f64; 3] {
    let (az, el) = (az_deg.to_radians(), el_deg.to_radians());
    let south = -range_km * el.cos() * az.cos();
    let east = range_km * el.cos() * az.sin();
    let zenith = range_km * el.sin();

    let (sin_lat, cos_lat) = observer.lat_rad().sin_cos();
    let (sin_lon, cos_lon) = observer.lon_rad().sin_cos();
    let sta = observer.position_ecef_km();
    [
        sta[0] + sin_lat * cos_lon * south - sin_lon * east + cos_lat * cos_lon * zenith,
        sta[1] + sin_lat * sin_lon * south + cos_lon * east + cos_lat * sin_lon * zenith,
        sta[2] - cos_lat * south + sin_lat * zenith,
    ]
}

fn ecef_to_teme(ecef: [f64; 3], timestamp: DateTime<Utc>) -> StateVector {
    let gmst = gmst_rad(timestamp);
    let (sin_g, cos_g) = gmst.sin_cos();
    let position = [
        ecef[0] * cos_g - ecef[1] * sin_g,
        ecef[0] * sin_g + ecef[1] * cos_g,
        ecef[2],
    ];
    StateVector {
        position_km: position,
        velocity_km_s: [
            -EARTH_ROTATION_RAD_S * position[1],
            EARTH_ROTATION_RAD_S * position[0],
            0.0,
        ],
    }
}

/// Object that stays above one spot on the ground.
pub struct FixedEcefOrbit {
    ecef_km: [f64; 3],
}

impl FixedEcefOrbit {
    pub fn new(ecef_km: [f64; 3]) -> Self {
        Self { ecef_km }
    }
}

impl OrbitHandle for FixedEcefOrbit {
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<StateVector, PropagationError> {
        Ok(ecef_to_teme(self.ecef_km, timestamp))
    }
}

/// Earth-fixed track computed by a closure; `None` simulates a propagation error.
pub struct ScriptedOrbit<F> {
    track: F,
}

impl<F> ScriptedOrbit<F>
where
    F: Fn(DateTime<Utc>) -> Option<[f64; 3]> + Send + Sync,
{
    pub fn new(track: F) -> Self {
        Self { track }
    }
}

impl<F> OrbitHandle for ScriptedOrbit<F>
where
    F: Fn(DateTime<Utc>) -> Option<[f64; 3]> + Send + Sync,
{
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<StateVector, PropagationError> {
        let ecef = (self.track)(timestamp)
            .ok_or_else(|| PropagationError::Propagation("scripted failure".into()))?;
        Ok(ecef_to_teme(ecef, timestamp))
    }
}

/// Hands out pre-built orbits by record name; unknown names fail to build.
#[derive(Default)]
pub struct TablePropagator {
    orbits: HashMap<String, Arc<dyn OrbitHandle>>,
    fallback: Option<Arc<dyn OrbitHandle>>,
}

impl TablePropagator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, orbit: impl OrbitHandle + 'static) -> Self {
        self.orbits.insert(name.to_string(), Arc::new(orbit));
        self
    }

    /// Orbit used for every name without an explicit entry.
    pub fn with_fallback(mut self, orbit: impl OrbitHandle + 'static) -> Self {
        self.fallback = Some(Arc::new(orbit));
        self
    }
}

impl OrbitPropagator for TablePropagator {
    fn build(
        &self,
        record: &OrbitalElementRecord,
    ) -> Result<Arc<dyn OrbitHandle>, PropagationError> {
        self.orbits
            .get(&record.name)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| PropagationError::Propagation(format!("no orbit for {}", record.name)))
    }
}

/// Element text with one dummy group per name.
pub fn element_text(names: &[&str]) -> String {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let id = 10_000 + i;
            format!(
                "{name}\n\
                 1 {id:05}U 00000A   26001.00000000  .00000000  00000-0  00000-0 0  9990\n\
                 2 {id:05}  51.6000   0.0000 0001000   0.0000   0.0000 15.50000000    00\n"
            )
        })
        .collect()
}

pub fn records(names: &[&str]) -> Vec<OrbitalElementRecord> {
    crate::elements::parse_elements(&element_text(names), Utc::now())
}
