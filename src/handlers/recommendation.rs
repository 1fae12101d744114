// src/handlers/recommendation.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError, models::recommendation::GenerateRecommendationRequest,
    quiz::RecommendationSelector, utils::jwt::Claims,
};

/// Stored recommendations for the learner, or the language fallback pair.
pub async fn get_recommendations(
    State(selector): State<RecommendationSelector>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let email = claims.learner_email()?;
    Ok(Json(selector.select(&email).await?))
}

/// Asks the provider for follow-up resources after a course quiz and stores them.
pub async fn generate_recommendations(
    State(selector): State<RecommendationSelector>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<GenerateRecommendationRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;
    if payload.score > payload.total {
        return Err(AppError::BadRequest("Score cannot exceed total".to_string()));
    }
    let email = claims.learner_email()?;

    let recommendations = selector
        .generate(&email, &payload.course_title, payload.score, payload.total)
        .await?;

    Ok(Json(recommendations))
}
