// src/quiz/history.rs

use std::{collections::HashMap, sync::Arc};

use crate::{
    config::WEAK_TOPIC_THRESHOLD,
    error::AppError,
    models::quiz_history::{AnswerDetail, NewTopicScoreRecord, QuestionDetail, TopicScoreRecord},
    store::QuizStore,
    utils::fingerprint::{exact_fingerprint, template_fingerprint},
};

/// Append-only quiz history and the weak-topic view derived from it.
///
/// Nothing is cached: every query re-reads the learner's full history, so
/// concurrent submissions never race on a shared aggregate.
#[derive(Clone)]
pub struct HistoryTracker {
    store: Arc<dyn QuizStore>,
}

impl HistoryTracker {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self { store }
    }

    /// Appends one topic score record, fingerprinting every detail's question.
    pub async fn record(
        &self,
        email: &str,
        topic: &str,
        score: i32,
        total: i32,
        details: &[AnswerDetail],
    ) -> Result<TopicScoreRecord, AppError> {
        let email = learner_key(email)?;
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AppError::BadRequest("Topic is required".to_string()));
        }
        if score < 0 || total < 0 || score > total {
            return Err(AppError::BadRequest(format!(
                "Invalid score {}/{}: expected 0 <= score <= total",
                score, total
            )));
        }

        let question_details = details
            .iter()
            .map(|d| QuestionDetail {
                question: d.question.clone(),
                user_answer: d.user_answer.clone(),
                correct_answer: d.correct_answer.clone(),
                was_correct: d.was_correct,
                question_hash: exact_fingerprint(&d.question),
                template_hash: template_fingerprint(&d.question),
            })
            .collect();

        let record = self
            .store
            .insert_topic_record(NewTopicScoreRecord {
                email,
                topic: topic.to_string(),
                score,
                total,
                question_details,
            })
            .await?;

        tracing::debug!(
            "Recorded {}/{} on '{}' for {}",
            record.score,
            record.total,
            record.topic,
            record.email
        );
        Ok(record)
    }

    /// Full history of a learner, newest first.
    pub async fn history(&self, email: &str) -> Result<Vec<TopicScoreRecord>, AppError> {
        let email = learner_key(email)?;
        self.store.records_for(&email).await
    }

    /// Topics whose cumulative accuracy is strictly below the threshold.
    ///
    /// Sorted by ratio (weakest first), then by name.
    pub async fn weak_topics(&self, email: &str) -> Result<Vec<String>, AppError> {
        let email = learner_key(email)?;
        let records = self.store.records_for(&email).await?;
        Ok(weak_topics_from(&records))
    }

    pub async fn has_seen_question(&self, email: &str, question: &str) -> Result<bool, AppError> {
        let email = learner_key(email)?;
        self.store
            .has_question_hash(&email, &exact_fingerprint(question))
            .await
    }

    pub async fn has_seen_template(&self, email: &str, question: &str) -> Result<bool, AppError> {
        let email = learner_key(email)?;
        self.store
            .has_template_hash(&email, &template_fingerprint(question))
            .await
    }
}

/// Learner emails are stored trimmed and lower-cased.
fn learner_key(email: &str) -> Result<String, AppError> {
    let key = email.trim().to_lowercase();
    if key.is_empty() {
        return Err(AppError::AuthError("Learner identity is required".to_string()));
    }
    Ok(key)
}

/// Aggregates records per topic and keeps those below the weak threshold.
pub fn weak_topics_from(records: &[TopicScoreRecord]) -> Vec<String> {
    let mut totals: HashMap<&str, (i64, i64)> = HashMap::new();
    for record in records {
        let entry = totals.entry(record.topic.as_str()).or_default();
        entry.0 += i64::from(record.score);
        entry.1 += i64::from(record.total);
    }

    let mut weak: Vec<(&str, f64)> = totals
        .into_iter()
        .filter(|(_, (_, total))| *total > 0)
        .map(|(topic, (score, total))| (topic, score as f64 / total as f64))
        .filter(|(_, ratio)| *ratio < WEAK_TOPIC_THRESHOLD)
        .collect();

    weak.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    weak.into_iter().map(|(topic, _)| topic.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn tracker() -> HistoryTracker {
        HistoryTracker::new(Arc::new(MemoryStore::new()))
    }

    fn detail(question: &str, correct: bool) -> AnswerDetail {
        AnswerDetail {
            question: question.to_string(),
            user_answer: "x".to_string(),
            correct_answer: "y".to_string(),
            was_correct: correct,
        }
    }

    #[tokio::test]
    async fn test_low_ratio_topic_is_weak() {
        let tracker = tracker();
        tracker.record("ada@example.com", "Loops", 2, 10, &[]).await.unwrap();
        assert_eq!(tracker.weak_topics("ada@example.com").await.unwrap(), vec!["Loops"]);
    }

    #[tokio::test]
    async fn test_high_ratio_topic_is_not_weak() {
        let tracker = tracker();
        tracker.record("ada@example.com", "Loops", 8, 10, &[]).await.unwrap();
        assert!(tracker.weak_topics("ada@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exact_threshold_is_not_weak() {
        let tracker = tracker();
        tracker.record("ada@example.com", "Loops", 3, 5, &[]).await.unwrap();
        tracker.record("ada@example.com", "Loops", 4, 5, &[]).await.unwrap();
        // 7/10 == 0.7, not strictly below
        assert!(tracker.weak_topics("ada@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_total_is_never_weak() {
        let tracker = tracker();
        tracker.record("ada@example.com", "Empty", 0, 0, &[]).await.unwrap();
        assert!(tracker.weak_topics("ada@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_append_only_and_aggregated() {
        let tracker = tracker();
        tracker.record("ada@example.com", "Loops", 1, 5, &[]).await.unwrap();
        tracker.record("ADA@example.com ", "Loops", 5, 5, &[]).await.unwrap();
        tracker.record("ada@example.com", "Functions", 0, 4, &[]).await.unwrap();

        let history = tracker.history("ada@example.com").await.unwrap();
        assert_eq!(history.len(), 3);
        // Loops: 6/10 weak, Functions: 0/4 weakest
        assert_eq!(
            tracker.weak_topics("ada@example.com").await.unwrap(),
            vec!["Functions", "Loops"]
        );
    }

    #[tokio::test]
    async fn test_record_rejects_invalid_scores() {
        let tracker = tracker();
        assert!(matches!(
            tracker.record("ada@example.com", "Loops", 6, 5, &[]).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            tracker.record("ada@example.com", "Loops", -1, 5, &[]).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            tracker.record("  ", "Loops", 1, 5, &[]).await,
            Err(AppError::AuthError(_))
        ));
    }

    #[tokio::test]
    async fn test_seen_checks_use_fingerprints() {
        let tracker = tracker();
        tracker
            .record(
                "ada@example.com",
                "Loops",
                1,
                1,
                &[detail("How many times does for i in range(5) run?", true)],
            )
            .await
            .unwrap();

        assert!(tracker
            .has_seen_question("ada@example.com", "how many times does for i in   range(5) run?")
            .await
            .unwrap());
        assert!(!tracker
            .has_seen_question("ada@example.com", "How many times does for j in range(9) run?")
            .await
            .unwrap());
        assert!(tracker
            .has_seen_template("ada@example.com", "How many times does for j in range(9) run?")
            .await
            .unwrap());
        assert!(!tracker
            .has_seen_template("grace@example.com", "How many times does for j in range(9) run?")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_stored_details_carry_fingerprints() {
        let tracker = tracker();
        let record = tracker
            .record("ada@example.com", "Loops", 0, 1, &[detail("What is x?", false)])
            .await
            .unwrap();
        assert_eq!(record.question_details[0].question_hash, exact_fingerprint("What is x?"));
        assert_eq!(record.question_details[0].template_hash, template_fingerprint("what is y?"));
    }
}
