mod error;
mod parsing;
mod source;
mod store;
mod types;

pub use error::ElementError;
pub use parsing::parse_elements;
pub use source::HttpSource;
#[cfg(test)]
pub use source::ElementSource;
pub use store::{ElementStore, FetchOrigin};
pub use types::OrbitalElementRecord;
