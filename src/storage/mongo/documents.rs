//! BSON representations of the stored records.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::domain::{Exercise, ExerciseId, NewExercise, NewUser, User, UserId};
use crate::error::{StorageError, StorageResult};

/// Document in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
}

impl From<NewUser> for UserDocument {
    fn from(user: NewUser) -> Self {
        Self {
            id: None,
            username: user.username,
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = StorageError;

    fn try_from(doc: UserDocument) -> StorageResult<Self> {
        let id = doc.id.ok_or_else(missing_id)?;
        Ok(Self {
            id: UserId::new(id.to_hex()),
            username: doc.username,
        })
    }
}

/// Document in the `exercises` collection.
///
/// Dates are stored as BSON datetimes at midnight UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub description: String,
    pub duration: i64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
}

impl From<NewExercise> for ExerciseDocument {
    fn from(exercise: NewExercise) -> Self {
        Self {
            id: None,
            user_id: exercise.user_id.as_str().to_string(),
            description: exercise.description,
            duration: exercise.duration,
            date: start_of_day(exercise.date),
        }
    }
}

impl TryFrom<ExerciseDocument> for Exercise {
    type Error = StorageError;

    fn try_from(doc: ExerciseDocument) -> StorageResult<Self> {
        let id = doc.id.ok_or_else(missing_id)?;
        Ok(Self {
            id: ExerciseId::new(id.to_hex()),
            user_id: UserId::new(doc.user_id),
            description: doc.description,
            duration: doc.duration,
            date: doc.date.date_naive(),
        })
    }
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn missing_id() -> StorageError {
    StorageError::Serialization("document has no _id".to_string())
}
