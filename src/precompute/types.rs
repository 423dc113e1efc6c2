use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::Category;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrajectorySample {
    pub timestamp: DateTime<Utc>,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
    pub altitude_km: f64,
    pub speed_km_s: f64,
    pub above_min_elevation: bool,
}

/// Forward-looking trajectory of one object. Replaced, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PrecomputedTrack {
    pub name: String,
    pub norad_id: Option<u32>,
    pub category: Category,
    /// Oldest first.
    pub samples: Vec<TrajectorySample>,
    pub will_be_visible: bool,
    pub peak_elevation_deg: f64,
}

impl PrecomputedTrack {
    pub fn first_sample(&self) -> Option<&TrajectorySample> {
        self.samples.first()
    }
}

/// Tracks expected to be visible in the lookahead window, published as one unit.
#[derive(Debug, Clone, Default)]
pub struct VisibilitySnapshot {
    pub tracks: HashMap<String, PrecomputedTrack>,
    pub generated_at: Option<DateTime<Utc>>,
}

impl VisibilitySnapshot {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
