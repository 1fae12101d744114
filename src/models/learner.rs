// src/models/learner.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::config::DEFAULT_EXPERIENCE;

/// Read-only snapshot of the preferences owned by the account service.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct LearnerPreferences {
    pub experience_preference: Option<String>,
    pub language_preference: Option<String>,
}

impl LearnerPreferences {
    /// Declared experience level, or the beginner default.
    pub fn experience(&self) -> &str {
        match self.experience_preference.as_deref().map(str::trim) {
            Some(level) if !level.is_empty() => level,
            _ => DEFAULT_EXPERIENCE,
        }
    }
}
