//! Storage layer module.
//!
//! This module provides trait-based storage abstraction allowing different backends
//! to be used without changing business logic.

pub mod factory;
pub mod memory;
pub mod mongo;
pub mod traits;

pub use factory::create_storage;
pub use memory::MemoryStorage;
pub use mongo::MongoStorage;
pub use traits::{ExerciseStorage, Storage, UserStorage};
