// src/store/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, types::Json};

use super::QuizStore;
use crate::{
    error::AppError,
    models::{
        learner::LearnerPreferences,
        quiz_history::{NewTopicScoreRecord, QuestionDetail, TopicScoreRecord},
        recommendation::RecommendationBatch,
    },
};

/// Helper struct for the `topic_score_records` table.
#[derive(FromRow)]
struct RecordRow {
    id: i64,
    email: String,
    topic: String,
    score: i32,
    total: i32,
    created_at: DateTime<Utc>,
}

/// Helper struct for the `question_details` table.
#[derive(FromRow)]
struct DetailRow {
    record_id: i64,
    question: String,
    user_answer: String,
    correct_answer: String,
    was_correct: bool,
    question_hash: String,
    template_hash: String,
}

impl From<DetailRow> for QuestionDetail {
    fn from(row: DetailRow) -> Self {
        Self {
            question: row.question,
            user_answer: row.user_answer,
            correct_answer: row.correct_answer,
            was_correct: row.was_correct,
            question_hash: row.question_hash,
            template_hash: row.template_hash,
        }
    }
}

#[derive(FromRow)]
struct BatchRow {
    email: String,
    course_title: String,
    lines: Json<Vec<String>>,
    updated_at: DateTime<Utc>,
}

impl From<BatchRow> for RecommendationBatch {
    fn from(row: BatchRow) -> Self {
        Self {
            email: row.email,
            course_title: row.course_title,
            lines: row.lines.0,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgStore {
    async fn insert_topic_record(
        &self,
        record: NewTopicScoreRecord,
    ) -> Result<TopicScoreRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            INSERT INTO topic_score_records (email, topic, score, total)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, topic, score, total, created_at
            "#,
        )
        .bind(&record.email)
        .bind(&record.topic)
        .bind(record.score)
        .bind(record.total)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert topic score record: {:?}", e);
            AppError::from(e)
        })?;

        if !record.question_details.is_empty() {
            let mut query_builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO question_details \
                 (record_id, email, question, user_answer, correct_answer, was_correct, question_hash, template_hash) ",
            );
            query_builder.push_values(&record.question_details, |mut b, detail| {
                b.push_bind(row.id)
                    .push_bind(&record.email)
                    .push_bind(&detail.question)
                    .push_bind(&detail.user_answer)
                    .push_bind(&detail.correct_answer)
                    .push_bind(detail.was_correct)
                    .push_bind(&detail.question_hash)
                    .push_bind(&detail.template_hash);
            });
            query_builder.build().execute(&mut *tx).await.map_err(|e| {
                tracing::error!("Failed to insert question details: {:?}", e);
                AppError::from(e)
            })?;
        }

        tx.commit().await?;

        Ok(TopicScoreRecord {
            id: row.id,
            email: row.email,
            topic: row.topic,
            score: row.score,
            total: row.total,
            created_at: row.created_at,
            question_details: record.question_details,
        })
    }

    async fn records_for(&self, email: &str) -> Result<Vec<TopicScoreRecord>, AppError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, email, topic, score, total, created_at
            FROM topic_score_records
            WHERE email = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        let details = sqlx::query_as::<_, DetailRow>(
            r#"
            SELECT record_id, question, user_answer, correct_answer, was_correct,
                   question_hash, template_hash
            FROM question_details
            WHERE email = $1
            ORDER BY record_id, id
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        let mut by_record: HashMap<i64, Vec<QuestionDetail>> = HashMap::new();
        for detail in details {
            by_record.entry(detail.record_id).or_default().push(detail.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| TopicScoreRecord {
                question_details: by_record.remove(&row.id).unwrap_or_default(),
                id: row.id,
                email: row.email,
                topic: row.topic,
                score: row.score,
                total: row.total,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn has_question_hash(&self, email: &str, hash: &str) -> Result<bool, AppError> {
        let seen = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM question_details WHERE email = $1 AND question_hash = $2)",
        )
        .bind(email)
        .bind(hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(seen)
    }

    async fn has_template_hash(&self, email: &str, hash: &str) -> Result<bool, AppError> {
        let seen = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM question_details WHERE email = $1 AND template_hash = $2)",
        )
        .bind(email)
        .bind(hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(seen)
    }

    async fn learner_preferences(
        &self,
        email: &str,
    ) -> Result<Option<LearnerPreferences>, AppError> {
        let preferences = sqlx::query_as::<_, LearnerPreferences>(
            "SELECT experience_preference, language_preference FROM learners WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(preferences)
    }

    async fn latest_recommendations(
        &self,
        email: &str,
    ) -> Result<Option<RecommendationBatch>, AppError> {
        let batch = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT email, course_title, lines, updated_at
            FROM recommendation_batches
            WHERE email = $1
            ORDER BY updated_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch.map(Into::into))
    }

    async fn save_recommendations(
        &self,
        email: &str,
        course_title: &str,
        lines: &[String],
    ) -> Result<RecommendationBatch, AppError> {
        let batch = sqlx::query_as::<_, BatchRow>(
            r#"
            INSERT INTO recommendation_batches (email, course_title, lines)
            VALUES ($1, $2, $3)
            RETURNING email, course_title, lines, updated_at
            "#,
        )
        .bind(email)
        .bind(course_title)
        .bind(Json(lines.to_vec()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save recommendations: {:?}", e);
            AppError::from(e)
        })?;

        Ok(batch.into())
    }
}
