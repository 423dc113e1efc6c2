mod loader;
mod priority;

pub use loader::{is_plausible, Catalog, CatalogLoader, LoadReport, Orbit};
pub use priority::Category;
