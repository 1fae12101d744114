// src/store/mod.rs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        learner::LearnerPreferences,
        quiz_history::{NewTopicScoreRecord, TopicScoreRecord},
        recommendation::RecommendationBatch,
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence consumed by the quiz engine.
///
/// Writes are single-record inserts; nothing is ever updated in place.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Appends one topic score record together with its question details.
    async fn insert_topic_record(
        &self,
        record: NewTopicScoreRecord,
    ) -> Result<TopicScoreRecord, AppError>;

    /// All records of a learner, newest first.
    async fn records_for(&self, email: &str) -> Result<Vec<TopicScoreRecord>, AppError>;

    async fn has_question_hash(&self, email: &str, hash: &str) -> Result<bool, AppError>;

    async fn has_template_hash(&self, email: &str, hash: &str) -> Result<bool, AppError>;

    /// Preferences owned by the account service. `None` when the learner is unknown.
    async fn learner_preferences(&self, email: &str)
    -> Result<Option<LearnerPreferences>, AppError>;

    /// The most recently updated recommendation batch of a learner.
    async fn latest_recommendations(
        &self,
        email: &str,
    ) -> Result<Option<RecommendationBatch>, AppError>;

    async fn save_recommendations(
        &self,
        email: &str,
        course_title: &str,
        lines: &[String],
    ) -> Result<RecommendationBatch, AppError>;
}
