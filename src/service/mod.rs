//! Service layer module.
//!
//! Contains the business logic behind each endpoint: input validation,
//! user resolution, and persistence.

pub mod exercise;
pub mod user;

pub use exercise::ExerciseService;
pub use user::UserService;
