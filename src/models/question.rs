// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single multiple-choice question as generated, parsed and scored.
///
/// Questions are not stored as such; they live inside one quiz attempt and
/// only their outcome is persisted through the history tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// The question text shown to the learner.
    #[validate(length(max = 2000))]
    pub question: String,

    /// Ordered option texts. Positions matter: "B" always means `options[1]`.
    #[validate(length(max = 4))]
    pub options: Vec<String>,

    /// The correct answer. Expected to match one option after normalization,
    /// but this is not guaranteed for provider-generated content.
    #[validate(length(max = 1000))]
    pub answer: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    /// Skill bucket for per-topic scoring. Absent means the default topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Question {
    /// Topic label, falling back to the default bucket.
    pub fn topic_or_default(&self) -> &str {
        match self.topic.as_deref().map(str::trim) {
            Some(topic) if !topic.is_empty() => topic,
            _ => crate::config::DEFAULT_TOPIC,
        }
    }
}
