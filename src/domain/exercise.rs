//! Exercise records and log filtering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::UserId;

/// Store-assigned exercise identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(String);

impl ExerciseId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A persisted exercise entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    /// Store-assigned identifier.
    pub id: ExerciseId,
    /// Owning user. Checked when the entry is created, never afterwards.
    pub user_id: UserId,
    /// Free-text description.
    pub description: String,
    /// Duration in minutes.
    pub duration: i64,
    /// Calendar date of the session.
    pub date: NaiveDate,
}

/// A validated exercise entry that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExercise {
    /// Owning user.
    pub user_id: UserId,
    /// Free-text description.
    pub description: String,
    /// Duration in minutes.
    pub duration: i64,
    /// Calendar date of the session.
    pub date: NaiveDate,
}

/// Selection of a user's exercise log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    /// Only entries for this user.
    pub user_id: UserId,
    /// Inclusive lower bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub to: Option<NaiveDate>,
    /// Maximum number of entries; `None` is unbounded.
    pub limit: Option<u64>,
}

impl LogFilter {
    /// Filter selecting every entry of `user_id`.
    #[must_use]
    pub const fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            from: None,
            to: None,
            limit: None,
        }
    }

    /// Whether `exercise` satisfies the user and date bounds. `limit` is not
    /// considered.
    #[must_use]
    pub fn matches(&self, exercise: &Exercise) -> bool {
        exercise.user_id == self.user_id
            && self.from.is_none_or(|from| exercise.date >= from)
            && self.to.is_none_or(|to| exercise.date <= to)
    }
}
