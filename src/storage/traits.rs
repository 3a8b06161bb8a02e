//! Storage trait definitions.
//!
//! These traits define the interface for storage backends, enabling swapping
//! between different implementations without changing business logic.

use async_trait::async_trait;

use crate::domain::{Exercise, LogFilter, NewExercise, NewUser, User, UserId};
use crate::error::StorageResult;

/// User collection operations.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Persist a new user and return it with its assigned id.
    async fn insert_user(&self, user: NewUser) -> StorageResult<User>;

    /// Look up a user by id.
    ///
    /// Returns `Ok(None)` for a well-formed id that matches nothing and
    /// `StorageError::InvalidId` for an id this backend could never have issued.
    async fn find_user(&self, id: &UserId) -> StorageResult<Option<User>>;

    /// All users in the store's natural order.
    async fn list_users(&self) -> StorageResult<Vec<User>>;
}

/// Exercise collection operations.
#[async_trait]
pub trait ExerciseStorage: Send + Sync {
    /// Persist a new exercise entry and return it with its assigned id.
    async fn insert_exercise(&self, exercise: NewExercise) -> StorageResult<Exercise>;

    /// Entries matching `filter`, in natural order, capped at `filter.limit`.
    async fn find_exercises(&self, filter: &LogFilter) -> StorageResult<Vec<Exercise>>;
}

/// Combined storage trait for all storage operations.
#[async_trait]
pub trait Storage: UserStorage + ExerciseStorage {
    /// Check if the storage backend is healthy and reachable.
    async fn health_check(&self) -> StorageResult<()>;

    /// Get the storage backend name.
    fn backend_name(&self) -> &'static str;

    /// Release connections held by the backend. Called once after the server stops.
    async fn shutdown(&self);
}
