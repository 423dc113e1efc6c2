use std::sync::Arc;

use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use super::{OrbitHandle, OrbitPropagator, PropagationError, StateVector};
use crate::elements::OrbitalElementRecord;

/// SGP4/SDP4 propagation backed by the `sgp4` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sgp4Propagator;

pub struct Sgp4Orbit {
    elements: Elements,
    constants: Constants,
}

impl Sgp4Orbit {
    pub fn from_lines(
        name: Option<String>,
        line1: &str,
        line2: &str,
    ) -> Result<Self, PropagationError> {
        let elements = Elements::from_tle(name, line1.as_bytes(), line2.as_bytes())?;
        let constants = Constants::from_elements(&elements)?;
        Ok(Self {
            elements,
            constants,
        })
    }
}

impl OrbitHandle for Sgp4Orbit {
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<StateVector, PropagationError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
            .map_err(|e| PropagationError::Propagation(e.to_string()))?;

        let prediction = self.constants.propagate(minutes)?;

        let state = StateVector {
            position_km: prediction.position,
            velocity_km_s: prediction.velocity,
        };
        if !state.is_finite() {
            return Err(PropagationError::NonFinite);
        }
        Ok(state)
    }
}

impl OrbitPropagator for Sgp4Propagator {
    fn build(
        &self,
        record: &OrbitalElementRecord,
    ) -> Result<Arc<dyn OrbitHandle>, PropagationError> {
        let orbit = Sgp4Orbit::from_lines(Some(record.name.clone()), &record.line1, &record.line2)?;
        Ok(Arc::new(orbit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ISS_LINE1: &str =
        "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
    const ISS_LINE2: &str =
        "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

    #[test]
    fn propagates_iss_near_epoch() {
        let orbit = Sgp4Orbit::from_lines(Some("ISS (ZARYA)".into()), ISS_LINE1, ISS_LINE2)
            .unwrap();
        let epoch = Utc.with_ymd_and_hms(2020, 7, 12, 21, 16, 1).unwrap();

        let state = orbit.position_at(epoch).unwrap();
        let p = state.position_km;
        let radius = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();

        assert!((6700.0..6900.0).contains(&radius), "radius {radius}");
        assert!((7.0..8.0).contains(&state.speed_km_s()));
    }

    #[test]
    fn rejects_corrupted_element_lines() {
        let broken = ISS_LINE2.replace("51.6461", "5x.6461");
        assert!(Sgp4Orbit::from_lines(None, ISS_LINE1, &broken).is_err());
    }
}
