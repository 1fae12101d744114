// src/handlers/quiz.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    config::MASTERY_THRESHOLD,
    error::AppError,
    models::quiz::{
        CustomQuizRequest, ParseQuizRequest, PersonalizedQuizRequest, PersonalizedQuizResponse,
        QuizResponse, SubmitQuizRequest, SubmitQuizResponse,
    },
    quiz::{
        HistoryTracker, QuizGenerator, RecommendationSelector, parser::parse_quiz_text,
        scorer::score_quiz,
    },
    utils::jwt::Claims,
};

/// Generates a topic-driven quiz for the current learner.
///
/// Malformed provider output surfaces as 502, an unreachable provider as 503;
/// both are safe to retry.
pub async fn generate_custom(
    State(generator): State<QuizGenerator>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CustomQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    let email = claims.learner_email()?;

    let quiz = generator
        .generate_custom(&email, &payload.topic, payload.num_questions)
        .await?;

    Ok(Json(QuizResponse { quiz }))
}

/// Generates a personalized quiz (adaptive by default).
///
/// "Nothing to generate" is returned as 200 with an empty quiz and a message.
pub async fn generate_personalized(
    State(generator): State<QuizGenerator>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PersonalizedQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = claims.learner_email()?;

    let result = generator.generate_personalized(&email, payload.mode).await?;

    Ok(Json(PersonalizedQuizResponse {
        quiz: result.questions,
        weak_topics: result.weak_topics,
        message: result.message,
    }))
}

/// Structures raw generated quiz text. Never fails on malformed text.
pub async fn parse_quiz(Json(payload): Json<ParseQuizRequest>) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(Json(parse_quiz_text(&payload.text)))
}

/// Scores a finished attempt and records it per topic.
///
/// * Unanswered questions count as incorrect.
/// * A failed history write is logged and reported via `history_saved`,
///   the learner still gets their score.
/// * Recommendations are attached when the score is below mastery.
pub async fn submit_quiz(
    State(history): State<HistoryTracker>,
    State(recommendations): State<RecommendationSelector>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    let email = claims.learner_email()?;

    let score = score_quiz(&payload.questions, &payload.answers);

    let mut history_saved = true;
    for topic in &score.topics {
        if let Err(e) = history
            .record(&email, &topic.topic, topic.score, topic.total, &topic.details)
            .await
        {
            tracing::error!("Failed to record quiz history for {}: {:?}", email, e);
            history_saved = false;
        }
    }

    let passed = score.ratio() >= MASTERY_THRESHOLD;
    let recommendations = if passed {
        None
    } else {
        match recommendations.select(&email).await {
            Ok(recs) => Some(recs),
            Err(e) => {
                tracing::warn!("Failed to select recommendations for {}: {:?}", email, e);
                None
            }
        }
    };

    Ok(Json(SubmitQuizResponse {
        score,
        passed,
        history_saved,
        recommendations,
    }))
}
