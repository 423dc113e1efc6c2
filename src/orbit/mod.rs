//! Propagation seam between the element catalog and the coordinate transform.
//!
//! The propagation model is supplied from outside: an [`OrbitPropagator`]
//! turns one element record into an [`OrbitHandle`], and the handle yields
//! TEME state vectors on demand. Errors are per call and never poison the
//! handle.

mod error;
mod propagator;
#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::elements::OrbitalElementRecord;

pub use error::PropagationError;
pub use propagator::Sgp4Propagator;

/// Inertial (TEME) position and velocity of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

impl StateVector {
    pub fn is_finite(&self) -> bool {
        self.position_km
            .iter()
            .chain(self.velocity_km_s.iter())
            .all(|v| v.is_finite())
    }

    pub fn speed_km_s(&self) -> f64 {
        let v = self.velocity_km_s;
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }
}

pub trait OrbitHandle: Send + Sync {
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<StateVector, PropagationError>;
}

pub trait OrbitPropagator: Send + Sync {
    fn build(&self, record: &OrbitalElementRecord)
        -> Result<Arc<dyn OrbitHandle>, PropagationError>;
}
