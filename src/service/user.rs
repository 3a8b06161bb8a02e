//! User service.

use std::sync::Arc;

use crate::domain::{CreateUserRequest, User, UserId};
use crate::error::{AppError, Result};
use crate::storage::traits::Storage;

/// Service for creating and looking up users.
pub struct UserService {
    /// Storage backend.
    storage: Arc<dyn Storage>,
}

impl UserService {
    /// Create a new user service.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Create a user. Usernames are not required to be unique.
    ///
    /// # Errors
    ///
    /// Returns an error if the username is missing or empty, or storage fails.
    pub async fn create(&self, request: CreateUserRequest) -> Result<User> {
        let new_user = request.validate()?;
        let user = self.storage.insert_user(new_user).await?;

        metrics::counter!("exercise_tracker_users_created_total").increment(1);
        tracing::info!(user_id = %user.id, username = %user.username, "User created");

        Ok(user)
    }

    /// All users in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn list(&self) -> Result<Vec<User>> {
        Ok(self.storage.list_users().await?)
    }

    /// Look up a user, treating absence as [`AppError::UserNotFound`].
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if no user has this id, or a storage error
    /// (including a malformed id).
    pub async fn get(&self, id: &UserId) -> Result<User> {
        self.storage
            .find_user(id)
            .await?
            .ok_or(AppError::UserNotFound)
    }
}
