//! Error types for the waymark library.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::WorkoutId;

#[derive(Error, Debug)]
pub enum Error {
    /// A required form field is missing, non-finite or out of range.
    #[error("Inputs have to be positive numbers")]
    InvalidInput {
        /// Which field was rejected.
        field: &'static str,
    },

    /// A workout was submitted before a point was picked on the map.
    #[error("no location selected; pick a point on the map first")]
    NoLocation,

    #[error("Could not get your position")]
    PositionUnavailable,

    #[error("no workout with id {id}")]
    UnknownWorkout { id: WorkoutId },

    #[error("invalid coordinates: {0}")]
    InvalidCoords(String),

    #[error("failed to open store at {path}: {source}")]
    StorageOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("store query failed: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GPX error: {0}")]
    Gpx(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    #[must_use]
    pub const fn invalid_input(field: &'static str) -> Self {
        Self::InvalidInput { field }
    }

    #[must_use]
    pub fn gpx(message: impl Into<String>) -> Self {
        Self::Gpx(message.into())
    }

    /// True for errors caused by what the user typed, as opposed to I/O or storage trouble.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::NoLocation
                | Self::PositionUnavailable
                | Self::UnknownWorkout { .. }
                | Self::InvalidCoords(_)
        )
    }
}
