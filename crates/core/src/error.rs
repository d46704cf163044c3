//! Error types for the core library

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Store query failed: {0}")]
    Query(String),

    #[error("Failed to decode stored document: {0}")]
    Decode(String),

    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl Error {
    /// Whether the failure came from reading a stored document rather than
    /// from talking to the store.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
