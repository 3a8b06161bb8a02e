//! Data Transfer Objects for API requests and responses.
//!
//! Request types keep every field optional so that missing or malformed input
//! reaches `validate()` instead of being rejected by the deserializer.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::date::{format_date, parse_date};
use super::{Exercise, LogFilter, NewExercise, NewUser, User, UserId};
use crate::error::ValidationError;

/// A JSON scalar accepted where a string is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

/// Deserialize an optional string, accepting numbers and booleans by their
/// textual form. `null` is absent.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

/// Body of `POST /api/users`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    /// Requested display name.
    #[serde(default, deserialize_with = "scalar_string")]
    pub username: Option<String>,
}

impl CreateUserRequest {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns an error if `username` is missing or empty.
    pub fn validate(self) -> Result<NewUser, ValidationError> {
        let username = self
            .username
            .ok_or(ValidationError::MissingField("username"))?;
        if username.is_empty() {
            return Err(ValidationError::Empty("username"));
        }
        Ok(NewUser { username })
    }
}

/// A duration as sent by clients: a JSON number or any string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    /// Integral JSON number.
    Integer(i64),
    /// Fractional JSON number, truncated toward zero.
    Float(f64),
    /// Form field or JSON string.
    Text(String),
}

impl DurationInput {
    /// Resolve to whole minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the value carries no leading integer.
    #[allow(clippy::cast_possible_truncation)]
    pub fn minutes(&self) -> Result<i64, ValidationError> {
        match self {
            Self::Integer(minutes) => Ok(*minutes),
            Self::Float(minutes) if minutes.is_finite() => Ok(minutes.trunc() as i64),
            Self::Float(minutes) => Err(ValidationError::InvalidNumber {
                field: "duration",
                value: minutes.to_string(),
            }),
            Self::Text(text) => parse_leading_int("duration", text),
        }
    }
}

/// Body of `POST /api/users/{id}/exercises`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddExerciseRequest {
    /// Free-text description.
    #[serde(default, deserialize_with = "scalar_string")]
    pub description: Option<String>,

    /// Duration in minutes.
    #[serde(default)]
    pub duration: Option<DurationInput>,

    /// Session date; defaults to today when absent or empty.
    #[serde(default, deserialize_with = "scalar_string")]
    pub date: Option<String>,
}

impl AddExerciseRequest {
    /// Validate the request for `user_id`, using `today` when no date is given.
    ///
    /// # Errors
    ///
    /// Returns an error if `description` is missing or empty, `duration` is
    /// missing or not numeric, or `date` cannot be parsed.
    pub fn validate(self, user_id: UserId, today: NaiveDate) -> Result<NewExercise, ValidationError> {
        let description = self
            .description
            .ok_or(ValidationError::MissingField("description"))?;
        if description.is_empty() {
            return Err(ValidationError::Empty("description"));
        }

        let duration = self
            .duration
            .ok_or(ValidationError::MissingField("duration"))?
            .minutes()?;

        let date = match non_empty(self.date.as_deref()) {
            Some(date) => parse_date("date", date)?,
            None => today,
        };

        Ok(NewExercise {
            user_id,
            description,
            duration,
            date,
        })
    }
}

/// Query string of `GET /api/users/{id}/logs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    /// Inclusive lower date bound.
    #[serde(default)]
    pub from: Option<String>,

    /// Inclusive upper date bound.
    #[serde(default)]
    pub to: Option<String>,

    /// Maximum number of entries.
    #[serde(default)]
    pub limit: Option<String>,
}

impl LogQuery {
    /// Validate the query into a [`LogFilter`] for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound is not a date or `limit` has no leading
    /// integer.
    pub fn validate(&self, user_id: UserId) -> Result<LogFilter, ValidationError> {
        let from = non_empty(self.from.as_deref())
            .map(|from| parse_date("from", from))
            .transpose()?;
        let to = non_empty(self.to.as_deref())
            .map(|to| parse_date("to", to))
            .transpose()?;

        let limit = match non_empty(self.limit.as_deref()) {
            None => None,
            // a negative limit caps the result like a positive one
            Some(raw) => match parse_leading_int("limit", raw)? {
                0 => None,
                n => Some(n.unsigned_abs()),
            },
        };

        Ok(LogFilter {
            user_id,
            from,
            to,
            limit,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Parse the leading integer of `input`.
///
/// Leading whitespace and a sign are accepted and anything after the first
/// non-digit is ignored, so `"30 min"` is 30.
///
/// # Errors
///
/// Returns an error if no digits precede the first other character or the
/// value overflows `i64`.
pub fn parse_leading_int(field: &'static str, input: &str) -> Result<i64, ValidationError> {
    let invalid = || ValidationError::InvalidNumber {
        field,
        value: input.to_string(),
    };

    let trimmed = input.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = unsigned
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return Err(invalid());
    }

    let magnitude: i64 = unsigned[..digits_len].parse().map_err(|_| invalid())?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// A user as returned by the user endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    /// User identifier.
    #[serde(rename = "_id")]
    pub id: UserId,

    /// Display name.
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Response of `POST /api/users/{id}/exercises`.
///
/// `_id` is the owning user's id, not the exercise's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseResponse {
    /// Owning user's identifier.
    #[serde(rename = "_id")]
    pub id: UserId,

    /// Owning user's name.
    pub username: String,

    /// Free-text description.
    pub description: String,

    /// Duration in minutes.
    pub duration: i64,

    /// Rendered date, e.g. `Sun Jan 15 2023`.
    pub date: String,
}

impl ExerciseResponse {
    /// Combine the owner and a stored exercise.
    #[must_use]
    pub fn new(user: User, exercise: Exercise) -> Self {
        Self {
            id: user.id,
            username: user.username,
            description: exercise.description,
            duration: exercise.duration,
            date: format_date(exercise.date),
        }
    }
}

/// One line of an exercise log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Free-text description.
    pub description: String,

    /// Duration in minutes.
    pub duration: i64,

    /// Rendered date.
    pub date: String,
}

impl From<Exercise> for LogEntry {
    fn from(exercise: Exercise) -> Self {
        Self {
            description: exercise.description,
            duration: exercise.duration,
            date: format_date(exercise.date),
        }
    }
}

/// Response of `GET /api/users/{id}/logs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogResponse {
    /// User identifier.
    #[serde(rename = "_id")]
    pub id: UserId,

    /// Display name.
    pub username: String,

    /// Number of entries in `log`.
    pub count: usize,

    /// Entries after filtering and limiting.
    pub log: Vec<LogEntry>,
}

impl LogResponse {
    /// Build the response; `count` always equals the number of entries.
    #[must_use]
    pub fn new(user: User, exercises: Vec<Exercise>) -> Self {
        let log: Vec<LogEntry> = exercises.into_iter().map(LogEntry::from).collect();
        Self {
            id: user.id,
            username: user.username,
            count: log.len(),
            log,
        }
    }
}
