//! User handlers.

use axum::{Json, extract::State};

use crate::api::extractors::FormOrJson;
use crate::api::state::AppState;
use crate::domain::{CreateUserRequest, UserResponse};
use crate::error::{ApiError, Operation, OperationContext, ValidationError};

/// Create a user.
///
/// # Errors
///
/// Returns an error if the body is unreadable, the username is missing or
/// storage fails.
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<FormOrJson<CreateUserRequest>, ValidationError>,
) -> Result<Json<UserResponse>, ApiError> {
    let FormOrJson(request) = body.during(Operation::CreateUser)?;
    let user = state
        .user_service
        .create(request)
        .await
        .during(Operation::CreateUser)?;

    Ok(Json(user.into()))
}

/// List every user.
///
/// # Errors
///
/// Returns an error if storage fails.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state
        .user_service
        .list()
        .await
        .during(Operation::ListUsers)?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
