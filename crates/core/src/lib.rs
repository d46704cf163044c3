//! Core library for the tasks service
//!
//! This crate contains the task model and the storage layer:
//! - Task records and client drafts
//! - The `TaskRepository` interface
//! - MongoDB and in-memory repository implementations

pub mod error;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
