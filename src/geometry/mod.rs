mod ground_station;
mod transform;

pub use ground_station::ObserverLocation;
pub use transform::{observe, orbital_speed_km_s, Observation};

#[cfg(test)]
pub use transform::gmst_rad;
