use thiserror::Error;

use crate::elements::ElementError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service already running")]
    AlreadyRunning,
    #[error("element source error: {0}")]
    Elements(#[from] ElementError),
}
