use thiserror::Error;

use crate::domain::ChargingNetwork;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed record #{index} in {file}: {message}")]
    MalformedRecord {
        file: String,
        index: usize,
        message: String,
    },

    #[error("Station has no location: {0}")]
    MissingLocation(String),

    #[error("Station has no identifying attribute at {0}")]
    Unidentifiable(String),

    #[error("Conflicting networks when merging stations: {first:?} vs {second:?}")]
    NetworkConflict {
        first: ChargingNetwork,
        second: ChargingNetwork,
    },
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
