// src/models/quiz.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    config::MAX_CUSTOM_QUESTIONS,
    models::{question::Question, recommendation::Recommendation},
    quiz::scorer::QuizScore,
};

/// DTO for a topic-driven quiz request.
#[derive(Debug, Deserialize, Validate)]
pub struct CustomQuizRequest {
    #[validate(length(min = 1, max = 100, message = "Topic must be between 1 and 100 characters."))]
    pub topic: String,
    #[validate(range(min = 1, max = MAX_CUSTOM_QUESTIONS, message = "Number of questions must be between 1 and 10."))]
    pub num_questions: u32,
}

/// How a personalized quiz picks its subject matter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalizedMode {
    /// Biased toward the learner's weak topics.
    #[default]
    Adaptive,
    /// General practice on the learner's preferred language.
    Refresher,
}

#[derive(Debug, Default, Deserialize)]
pub struct PersonalizedQuizRequest {
    #[serde(default)]
    pub mode: PersonalizedMode,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ParseQuizRequest {
    #[validate(length(max = 50000))]
    pub text: String,
}

/// DTO for submitting a finished attempt.
///
/// The attempt is not stored server-side, so the client sends back the
/// questions it was shown alongside its answers.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    #[validate(
        length(min = 1, max = 50, message = "A quiz must contain between 1 and 50 questions."),
        nested
    )]
    pub questions: Vec<Question>,

    /// Key: question index. Value: selected option text.
    #[serde(default)]
    pub answers: HashMap<usize, String>,
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub quiz: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct PersonalizedQuizResponse {
    pub quiz: Vec<Question>,
    pub weak_topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    #[serde(flatten)]
    pub score: QuizScore,
    pub passed: bool,
    pub history_saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Recommendation>>,
}
