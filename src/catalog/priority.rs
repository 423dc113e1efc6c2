use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Station,
    Communications,
    Navigation,
    EarthObservation,
    Weather,
    Science,
    Other,
}

const STATIONS: &[&str] = &["ISS (", "ZARYA", "TIANGONG", "TIANHE", "WENTIAN", "MENGTIAN", "CSS ("];
const CONSTELLATIONS: &[&str] = &["STARLINK", "ONEWEB", "IRIDIUM", "GLOBALSTAR", "ORBCOMM"];
const NAVIGATION: &[&str] = &[
    "NAVSTAR", "GPS ", "GLONASS", "COSMOS 2", "GALILEO", "BEIDOU", "IRNSS", "QZS",
];
const WEATHER: &[&str] = &[
    "NOAA", "GOES", "METEOR-M", "METOP", "HIMAWARI", "FENGYUN", "FY-", "DMSP",
];
const EARTH_OBSERVATION: &[&str] = &[
    "LANDSAT", "SENTINEL", "WORLDVIEW", "FLOCK", "SKYSAT", "SPOT ", "TERRA", "AQUA", "RADARSAT",
];
const SCIENCE: &[&str] = &["HST", "HUBBLE", "SWIFT", "FERMI", "CHANDRA", "TESS", "NUSTAR", "AGILE"];
const COMMUNICATIONS: &[&str] = &[
    "INTELSAT", "SES ", "EUTELSAT", "TELESAT", "INMARSAT", "VIASAT", "AMSAT", "O3B",
];

fn matches(name: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| name.contains(p))
}

/// Category from name substrings. Checked most specific first.
pub fn classify(name: &str) -> Category {
    let name = name.to_uppercase();

    if name == "ISS" || matches(&name, STATIONS) {
        Category::Station
    } else if matches(&name, NAVIGATION) {
        Category::Navigation
    } else if matches(&name, WEATHER) {
        Category::Weather
    } else if matches(&name, EARTH_OBSERVATION) {
        Category::EarthObservation
    } else if matches(&name, SCIENCE) {
        Category::Science
    } else if matches(&name, CONSTELLATIONS) || matches(&name, COMMUNICATIONS) {
        Category::Communications
    } else {
        Category::Other
    }
}

/// Load priority, lower first: stations, large constellations, navigation, rest.
pub fn priority(name: &str) -> u8 {
    let upper = name.to_uppercase();
    match classify(name) {
        Category::Station => 0,
        _ if matches(&upper, CONSTELLATIONS) => 1,
        Category::Navigation => 2,
        _ => 3,
    }
}
