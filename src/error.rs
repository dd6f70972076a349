//! Crate Error Type
//!
//! Aggregates the errors of the individual layers for callers that just
//! want one `Result`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::fetch::FetchError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
