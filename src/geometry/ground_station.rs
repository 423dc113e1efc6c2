use super::transform::EARTH_RADIUS_KM;

/// Fixed ground location the sky is observed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverLocation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

impl Default for ObserverLocation {
    fn default() -> Self {
        Self {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            altitude_km: 0.0,
        }
    }
}

impl ObserverLocation {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_km: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_km,
        }
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    /// Earth-fixed position on a spherical Earth of equatorial radius.
    pub fn position_ecef_km(&self) -> [f64; 3] {
        let r = EARTH_RADIUS_KM + self.altitude_km;
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        [
            r * lat.cos() * lon.cos(),
            r * lat.cos() * lon.sin(),
            r * lat.sin(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equator_prime_meridian_is_on_x_axis() {
        let p = ObserverLocation::default().position_ecef_km();
        assert!((p[0] - EARTH_RADIUS_KM).abs() < 1e-9);
        assert!(p[1].abs() < 1e-9);
        assert!(p[2].abs() < 1e-9);
    }

    #[test]
    fn pole_with_altitude() {
        let p = ObserverLocation::new(90.0, 45.0, 1.5).position_ecef_km();
        assert!((p[2] - (EARTH_RADIUS_KM + 1.5)).abs() < 1e-9);
        assert!(p[0].abs() < 1e-6 && p[1].abs() < 1e-6);
    }
}
