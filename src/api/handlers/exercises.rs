//! Exercise and log handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};

use crate::api::extractors::FormOrJson;
use crate::api::state::AppState;
use crate::domain::{AddExerciseRequest, ExerciseResponse, LogQuery, LogResponse, UserId};
use crate::error::{ApiError, AppError, Operation, OperationContext, ValidationError};

/// Add an exercise to a user's log.
///
/// # Errors
///
/// Returns 400 if the user does not exist, 500 for invalid input or storage failures.
pub async fn add_exercise(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<FormOrJson<AddExerciseRequest>, ValidationError>,
) -> Result<Json<ExerciseResponse>, ApiError> {
    let user_id = UserId::new(user_id);
    let request = match body {
        Ok(FormOrJson(request)) => request,
        Err(rejection) => {
            return Err(reject(&state, &user_id, rejection, Operation::AddExercise).await);
        }
    };

    let (user, exercise) = state
        .exercise_service
        .add(user_id, request)
        .await
        .during(Operation::AddExercise)?;

    Ok(Json(ExerciseResponse::new(user, exercise)))
}

/// Fetch a user's exercise log.
///
/// # Errors
///
/// Returns 400 if the user does not exist, 500 for invalid bounds or storage failures.
pub async fn get_logs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    query: Result<Query<LogQuery>, QueryRejection>,
) -> Result<Json<LogResponse>, ApiError> {
    let user_id = UserId::new(user_id);
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            let rejection = ValidationError::MalformedQuery(rejection.body_text());
            return Err(reject(&state, &user_id, rejection, Operation::GetLogs).await);
        }
    };

    let (user, exercises) = state
        .exercise_service
        .log(user_id, &query)
        .await
        .during(Operation::GetLogs)?;

    Ok(Json(LogResponse::new(user, exercises)))
}

/// Report undecodable input, unless the user is unknown.
async fn reject(
    state: &AppState,
    user_id: &UserId,
    rejection: ValidationError,
    operation: Operation,
) -> ApiError {
    match state.user_service.get(user_id).await {
        Ok(_) => AppError::from(rejection).during(operation),
        Err(e) => e.during(operation),
    }
}
