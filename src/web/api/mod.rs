pub mod error;
pub mod sky;
