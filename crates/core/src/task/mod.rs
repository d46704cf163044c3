//! Task module
//!
//! This module contains task types and the stores that persist them.

mod memory_store;
mod model;
mod mongo_store;
mod repository;

pub use memory_store::MemoryTaskStore;
pub use model::*;
pub use mongo_store::{MongoTaskStore, MongoTaskStoreConfig};
pub use repository::TaskRepository;
