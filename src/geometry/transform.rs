//! Observer-relative look angles from inertial propagation output.
//!
//! TEME positions are rotated into an Earth-fixed frame by GMST, the observer
//! is placed on a spherical Earth, and the relative vector is expressed in the
//! observer's South-East-Zenith frame. Rotation and look-angle derivation must
//! always use the same instant.

use chrono::{DateTime, Utc};
use std::f64::consts::TAU;

use super::ground_station::ObserverLocation;
use crate::orbit::{OrbitHandle, PropagationError};

/// Equatorial radius, km.
pub const EARTH_RADIUS_KM: f64 = 6378.137;
/// Earth gravitational parameter, km^3/s^2.
pub const EARTH_MU_KM3_S2: f64 = 398_600.4418;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
}

impl LookAngles {
    pub fn is_finite(&self) -> bool {
        self.azimuth_deg.is_finite() && self.elevation_deg.is_finite() && self.range_km.is_finite()
    }
}

/// Everything derived from one propagation of one orbit at one instant.
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    pub look: LookAngles,
    /// Height of the object above the spherical Earth.
    pub altitude_km: f64,
    /// Magnitude of the inertial velocity vector.
    pub speed_km_s: f64,
}

/// Greenwich Mean Sidereal Time (IAU 1982), radians in [0, 2pi).
pub fn gmst_rad(timestamp: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()))
        .rem_euclid(TAU)
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

/// Rotate an Earth-fixed vector into (south, east, zenith).
pub fn ecef_to_sez(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let south = sin_lat * cos_lon * dr[0] + sin_lat * sin_lon * dr[1] - cos_lat * dr[2];
    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let zenith = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (south, east, zenith)
}

pub fn look_angles(sat_ecef: [f64; 3], observer: &ObserverLocation) -> LookAngles {
    let sta = observer.position_ecef_km();
    let dr = [
        sat_ecef[0] - sta[0],
        sat_ecef[1] - sta[1],
        sat_ecef[2] - sta[2],
    ];
    let range_km = norm(dr);

    let (south, east, zenith) = ecef_to_sez(dr, observer.lat_rad(), observer.lon_rad());
    let elevation = if range_km > 0.0 {
        (zenith / range_km).clamp(-1.0, 1.0).asin().to_degrees()
    } else {
        90.0
    };
    let azimuth = east.atan2(-south).to_degrees().rem_euclid(360.0);

    LookAngles {
        azimuth_deg: azimuth,
        elevation_deg: elevation,
        range_km,
    }
}

/// Circular (vis-viva with a = r) speed for an object at the given altitude.
pub fn orbital_speed_km_s(altitude_km: f64) -> f64 {
    let r = EARTH_RADIUS_KM + altitude_km;
    if r > 0.0 {
        (EARTH_MU_KM3_S2 / r).sqrt()
    } else {
        0.0
    }
}

/// Propagate `orbit` at `timestamp` and express the result relative to `observer`.
pub fn observe(
    orbit: &dyn OrbitHandle,
    timestamp: DateTime<Utc>,
    observer: &ObserverLocation,
) -> Result<Observation, PropagationError> {
    let state = orbit.position_at(timestamp)?;
    if !state.is_finite() {
        return Err(PropagationError::NonFinite);
    }

    let gmst = gmst_rad(timestamp);
    let sat_ecef = teme_to_ecef_position(state.position_km, gmst);
    let altitude_km = norm(sat_ecef) - EARTH_RADIUS_KM;

    let look = look_angles(sat_ecef, observer);
    if !look.is_finite() {
        return Err(PropagationError::NonFinite);
    }

    Ok(Observation {
        look,
        altitude_km,
        speed_km_s: state.speed_km_s(),
    })
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
