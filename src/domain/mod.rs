//! Domain models for the exercise tracker.
//!
//! This module contains the core domain types representing users, exercise
//! entries, log filters, and API contracts.

pub mod date;
pub mod dto;
pub mod exercise;
pub mod user;

pub use date::{format_date, parse_date};
pub use dto::{
    AddExerciseRequest, CreateUserRequest, DurationInput, ExerciseResponse, LogEntry, LogQuery,
    LogResponse, UserResponse, parse_leading_int,
};
pub use exercise::{Exercise, ExerciseId, LogFilter, NewExercise};
pub use user::{NewUser, User, UserId};
