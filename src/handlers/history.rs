// src/handlers/history.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz_history::{SaveHistoryRequest, WeakTopicsResponse},
    quiz::HistoryTracker,
    utils::jwt::Claims,
};

/// Saves a quiz result for the current learner.
///
/// Returns 201 Created and the stored record, fingerprints included.
pub async fn save_history(
    State(history): State<HistoryTracker>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SaveHistoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    let email = claims.learner_email()?;

    let record = history
        .record(
            &email,
            &payload.topic,
            payload.score,
            payload.total,
            &payload.question_details,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Lists the current learner's quiz history, newest first.
pub async fn list_history(
    State(history): State<HistoryTracker>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let email = claims.learner_email()?;
    Ok(Json(history.history(&email).await?))
}

/// Topics where the learner's cumulative accuracy is below 70%.
pub async fn weak_topics(
    State(history): State<HistoryTracker>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let email = claims.learner_email()?;
    let weak_topics = history.weak_topics(&email).await?;

    Ok(Json(WeakTopicsResponse { weak_topics }))
}
