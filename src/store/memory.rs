// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::QuizStore;
use crate::{
    error::AppError,
    models::{
        learner::LearnerPreferences,
        quiz_history::{NewTopicScoreRecord, TopicScoreRecord},
        recommendation::RecommendationBatch,
    },
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    records: Vec<TopicScoreRecord>,
    preferences: HashMap<String, LearnerPreferences>,
    recommendations: Vec<RecommendationBatch>,
}

/// In-process store for tests and database-less local runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stands in for the account service writing a learner's preferences.
    pub async fn set_preferences(&self, email: &str, preferences: LearnerPreferences) {
        self.inner
            .write()
            .await
            .preferences
            .insert(email.to_lowercase(), preferences);
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn insert_topic_record(
        &self,
        record: NewTopicScoreRecord,
    ) -> Result<TopicScoreRecord, AppError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let stored = TopicScoreRecord {
            id: inner.next_id,
            email: record.email,
            topic: record.topic,
            score: record.score,
            total: record.total,
            created_at: Utc::now(),
            question_details: record.question_details,
        };
        inner.records.push(stored.clone());

        Ok(stored)
    }

    async fn records_for(&self, email: &str) -> Result<Vec<TopicScoreRecord>, AppError> {
        let inner = self.inner.read().await;
        let mut records: Vec<TopicScoreRecord> = inner
            .records
            .iter()
            .filter(|r| r.email == email)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn has_question_hash(&self, email: &str, hash: &str) -> Result<bool, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .filter(|r| r.email == email)
            .flat_map(|r| &r.question_details)
            .any(|d| d.question_hash == hash))
    }

    async fn has_template_hash(&self, email: &str, hash: &str) -> Result<bool, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .filter(|r| r.email == email)
            .flat_map(|r| &r.question_details)
            .any(|d| d.template_hash == hash))
    }

    async fn learner_preferences(
        &self,
        email: &str,
    ) -> Result<Option<LearnerPreferences>, AppError> {
        Ok(self.inner.read().await.preferences.get(email).cloned())
    }

    async fn latest_recommendations(
        &self,
        email: &str,
    ) -> Result<Option<RecommendationBatch>, AppError> {
        let inner = self.inner.read().await;
        // Later inserts win ties on `updated_at`.
        Ok(inner
            .recommendations
            .iter()
            .enumerate()
            .filter(|(_, b)| b.email == email)
            .max_by(|(ia, a), (ib, b)| a.updated_at.cmp(&b.updated_at).then(ia.cmp(ib)))
            .map(|(_, b)| b.clone()))
    }

    async fn save_recommendations(
        &self,
        email: &str,
        course_title: &str,
        lines: &[String],
    ) -> Result<RecommendationBatch, AppError> {
        let batch = RecommendationBatch {
            email: email.to_string(),
            course_title: course_title.to_string(),
            lines: lines.to_vec(),
            updated_at: Utc::now(),
        };
        self.inner.write().await.recommendations.push(batch.clone());
        Ok(batch)
    }
}
