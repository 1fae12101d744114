// src/models/quiz_history.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Outcome of one question within a scored attempt, before fingerprinting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AnswerDetail {
    #[validate(length(max = 2000))]
    pub question: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub user_answer: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub correct_answer: String,
    #[serde(default)]
    pub was_correct: bool,
}

/// Persisted per-question outcome, carrying both fingerprints of the question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDetail {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub was_correct: bool,
    pub question_hash: String,
    pub template_hash: String,
}

/// One row per (learner, topic, attempt): the append-only history unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicScoreRecord {
    pub id: i64,
    pub email: String,
    pub topic: String,
    pub score: i32,
    pub total: i32,
    pub created_at: DateTime<Utc>,
    pub question_details: Vec<QuestionDetail>,
}

/// Insert payload for the store; `id` and `created_at` are assigned on write.
#[derive(Debug, Clone)]
pub struct NewTopicScoreRecord {
    pub email: String,
    pub topic: String,
    pub score: i32,
    pub total: i32,
    pub question_details: Vec<QuestionDetail>,
}

/// DTO for saving a quiz result directly (e.g. from a lesson-end quiz).
#[derive(Debug, Deserialize, Validate)]
pub struct SaveHistoryRequest {
    #[validate(length(min = 1, max = 100, message = "Topic must be between 1 and 100 characters."))]
    pub topic: String,
    #[validate(range(min = 0))]
    pub score: i32,
    #[validate(range(min = 0))]
    pub total: i32,
    #[serde(default)]
    #[validate(nested)]
    pub question_details: Vec<AnswerDetail>,
}

#[derive(Debug, Serialize)]
pub struct WeakTopicsResponse {
    pub weak_topics: Vec<String>,
}
