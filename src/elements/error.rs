use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElementError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("element source returned status {0}")]
    Status(u16),
    #[error("cache IO error: {0}")]
    Io(#[from] std::io::Error),
}
