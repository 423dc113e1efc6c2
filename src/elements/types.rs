use chrono::{DateTime, Utc};

/// One three-line element group as received from the element source.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalElementRecord {
    pub name: String,
    pub line1: String,
    pub line2: String,
    pub norad_id: Option<u32>,
    pub fetched_at: DateTime<Utc>,
}
