#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{CheckpointRepository, InMemoryRepository, Storage, StorageError};
