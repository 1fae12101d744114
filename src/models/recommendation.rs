// src/models/recommendation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Video,
    Article,
}

/// A follow-up learning resource shown after a weak quiz result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub link: Option<String>,
    pub hostname: String,
    pub thumbnail: String,
}

/// Free-text recommendation lines stored for a learner after a course quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationBatch {
    pub email: String,
    pub course_title: String,
    pub lines: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for asking the provider to write recommendations for a finished course quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRecommendationRequest {
    #[validate(length(min = 1, max = 200))]
    pub course_title: String,
    #[validate(range(min = 0))]
    pub score: i32,
    #[validate(range(min = 1))]
    pub total: i32,
}
