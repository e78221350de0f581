//! Error types for Shipyard core.

use std::{error::Error, fmt};

/// Error type for ship registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShipyardError {
    /// The request was malformed or failed validation.
    BadRequest(String),
    /// The requested ship does not exist.
    NotFound(String),
    /// The backing store failed.
    Store(String),
}

impl ShipyardError {
    /// Build a `BadRequest` error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Build a `NotFound` error for a ship id.
    pub fn ship_not_found(id: i64) -> Self {
        Self::NotFound(format!("ship {id} not found"))
    }

    /// Build a `Store` error from any displayable failure.
    pub fn store(err: impl fmt::Display) -> Self {
        Self::Store(err.to_string())
    }
}

impl fmt::Display for ShipyardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest(message) => write!(f, "bad request: {message}"),
            Self::NotFound(message) => write!(f, "{message}"),
            Self::Store(message) => write!(f, "store error: {message}"),
        }
    }
}

impl Error for ShipyardError {}

/// Convenience result type for Shipyard core.
pub type Result<T> = std::result::Result<T, ShipyardError>;
