//! In-memory storage backend.
//!
//! Keeps both collections in insertion order behind a read/write lock.
//! Suitable for development and tests; everything is lost on restart.

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::{Exercise, ExerciseId, LogFilter, NewExercise, NewUser, User, UserId};
use crate::error::{StorageError, StorageResult};
use crate::storage::traits::{ExerciseStorage, Storage, UserStorage};

/// In-memory storage implementation.
#[derive(Default)]
pub struct MemoryStorage {
    users: RwLock<Vec<User>>,
    exercises: RwLock<Vec<Exercise>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids are UUIDs; anything else could not have been issued here.
    fn check_id(id: &UserId) -> StorageResult<()> {
        Uuid::parse_str(id.as_str())
            .map(|_| ())
            .map_err(|_| StorageError::InvalidId(id.to_string()))
    }
}

#[async_trait]
impl UserStorage for MemoryStorage {
    async fn insert_user(&self, user: NewUser) -> StorageResult<User> {
        let user = User {
            id: UserId::new(Uuid::new_v4().to_string()),
            username: user.username,
        };
        self.users.write().push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: &UserId) -> StorageResult<Option<User>> {
        Self::check_id(id)?;
        Ok(self.users.read().iter().find(|user| &user.id == id).cloned())
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        Ok(self.users.read().clone())
    }
}

#[async_trait]
impl ExerciseStorage for MemoryStorage {
    async fn insert_exercise(&self, exercise: NewExercise) -> StorageResult<Exercise> {
        let exercise = Exercise {
            id: ExerciseId::new(Uuid::new_v4().to_string()),
            user_id: exercise.user_id,
            description: exercise.description,
            duration: exercise.duration,
            date: exercise.date,
        };
        self.exercises.write().push(exercise.clone());
        Ok(exercise)
    }

    async fn find_exercises(&self, filter: &LogFilter) -> StorageResult<Vec<Exercise>> {
        let limit = filter
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(self
            .exercises
            .read()
            .iter()
            .filter(|exercise| filter.matches(exercise))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn shutdown(&self) {
        tracing::debug!(
            users = self.users.read().len(),
            exercises = self.exercises.read().len(),
            "Discarding in-memory data"
        );
    }
}
