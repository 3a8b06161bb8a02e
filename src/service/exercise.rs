//! Exercise service.
//!
//! Adds entries to a user's log and answers filtered log queries.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{AddExerciseRequest, Exercise, LogQuery, User, UserId};
use crate::error::Result;
use crate::service::UserService;
use crate::storage::traits::Storage;

/// Service for exercise entries.
pub struct ExerciseService {
    /// Storage backend.
    storage: Arc<dyn Storage>,
    /// Used to resolve the owning user.
    users: Arc<UserService>,
}

impl ExerciseService {
    /// Create a new exercise service.
    pub fn new(storage: Arc<dyn Storage>, users: Arc<UserService>) -> Self {
        Self { storage, users }
    }

    /// Add an entry to `user_id`'s log.
    ///
    /// The user is resolved before the request is validated, so an unknown
    /// user is reported even when the body is also invalid.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` for an unknown user, a validation error for bad
    /// input, or a storage error.
    pub async fn add(&self, user_id: UserId, request: AddExerciseRequest) -> Result<(User, Exercise)> {
        let user = self.users.get(&user_id).await?;

        let new_exercise = request.validate(user_id, Utc::now().date_naive())?;
        let exercise = self.storage.insert_exercise(new_exercise).await?;

        metrics::counter!("exercise_tracker_exercises_added_total").increment(1);
        tracing::info!(
            user_id = %user.id,
            exercise_id = exercise.id.as_str(),
            duration = exercise.duration,
            date = %exercise.date,
            "Exercise added"
        );

        Ok((user, exercise))
    }

    /// Fetch `user_id`'s log restricted by `query`.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` for an unknown user, a validation error for a
    /// bad bound or limit, or a storage error.
    pub async fn log(&self, user_id: UserId, query: &LogQuery) -> Result<(User, Vec<Exercise>)> {
        let user = self.users.get(&user_id).await?;

        let filter = query.validate(user_id)?;
        let exercises = self.storage.find_exercises(&filter).await?;

        metrics::counter!("exercise_tracker_log_queries_total").increment(1);
        tracing::debug!(
            user_id = %user.id,
            from = ?filter.from,
            to = ?filter.to,
            limit = ?filter.limit,
            returned = exercises.len(),
            "Exercise log fetched"
        );

        Ok((user, exercises))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{CreateUserRequest, DurationInput};
    use crate::error::AppError;
    use crate::storage::MemoryStorage;

    struct Fixture {
        users: Arc<UserService>,
        exercises: ExerciseService,
    }

    fn fixture() -> Fixture {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let users = Arc::new(UserService::new(Arc::clone(&storage)));
        let exercises = ExerciseService::new(storage, Arc::clone(&users));
        Fixture { users, exercises }
    }

    async fn user(fixture: &Fixture, name: &str) -> User {
        fixture
            .users
            .create(CreateUserRequest {
                username: Some(name.to_string()),
            })
            .await
            .unwrap()
    }

    fn entry(description: &str, duration: i64, date: Option<&str>) -> AddExerciseRequest {
        AddExerciseRequest {
            description: Some(description.to_string()),
            duration: Some(DurationInput::Integer(duration)),
            date: date.map(ToString::to_string),
        }
    }

    #[tokio::test]
    async fn test_add_exercise() {
        let fixture = fixture();
        let owner = user(&fixture, "runner").await;

        let (found, exercise) = fixture
            .exercises
            .add(owner.id.clone(), entry("test run", 30, Some("2023-01-15")))
            .await
            .unwrap();

        assert_eq!(found, owner);
        assert_eq!(exercise.user_id, owner.id);
        assert_eq!(exercise.duration, 30);
        assert_eq!(exercise.date, NaiveDate::from_ymd_opt(2023, 1, 15).unwrap());
    }

    #[tokio::test]
    async fn test_add_defaults_to_today() {
        let fixture = fixture();
        let owner = user(&fixture, "runner").await;

        let (_, exercise) = fixture
            .exercises
            .add(owner.id, entry("walk", 10, None))
            .await
            .unwrap();

        assert_eq!(exercise.date, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn test_unknown_user_checked_before_validation() {
        let fixture = fixture();
        let unknown = UserId::new(uuid::Uuid::new_v4().to_string());

        let result = fixture
            .exercises
            .add(unknown.clone(), AddExerciseRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::UserNotFound)));

        let result = fixture.exercises.log(unknown, &LogQuery::default()).await;
        assert!(matches!(result, Err(AppError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_log_range_and_limit() {
        let fixture = fixture();
        let owner = user(&fixture, "runner").await;
        let other = user(&fixture, "walker").await;

        for day in ["2023-01-02", "2023-01-09", "2023-01-16", "2023-01-23", "2023-01-30"] {
            fixture
                .exercises
                .add(owner.id.clone(), entry("run", 20, Some(day)))
                .await
                .unwrap();
        }
        fixture
            .exercises
            .add(owner.id.clone(), entry("late", 20, Some("2023-02-01")))
            .await
            .unwrap();
        fixture
            .exercises
            .add(other.id.clone(), entry("theirs", 20, Some("2023-01-10")))
            .await
            .unwrap();

        let query = LogQuery {
            from: Some("2023-01-01".to_string()),
            to: Some("2023-01-31".to_string()),
            limit: Some("2".to_string()),
        };
        let (_, log) = fixture.exercises.log(owner.id.clone(), &query).await.unwrap();
        assert_eq!(log.len(), 2);

        let (_, all) = fixture
            .exercises
            .log(owner.id, &LogQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 6);
        assert!(all.iter().all(|e| e.description != "theirs"));
    }

    #[tokio::test]
    async fn test_empty_log() {
        let fixture = fixture();
        let owner = user(&fixture, "idle").await;

        let (_, log) = fixture
            .exercises
            .log(owner.id, &LogQuery::default())
            .await
            .unwrap();
        assert!(log.is_empty());
    }
}
