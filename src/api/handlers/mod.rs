//! HTTP request handlers.

pub mod exercises;
pub mod health;
pub mod users;
