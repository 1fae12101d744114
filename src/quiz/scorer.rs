// src/quiz/scorer.rs

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    models::{question::Question, quiz_history::AnswerDetail},
    utils::normalize::answers_match,
};

/// Per-question outcome, in quiz order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    pub index: usize,
    pub topic: String,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub correct: bool,
}

/// Aggregate of one topic inside an attempt; the input to the history tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicBreakdown {
    pub topic: String,
    pub score: i32,
    pub total: i32,
    pub details: Vec<AnswerDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizScore {
    pub correct_count: usize,
    pub total: usize,
    pub percentage: f64,
    pub results: Vec<QuestionResult>,
    pub topics: Vec<TopicBreakdown>,
}

impl QuizScore {
    /// Fraction of questions answered correctly; an empty quiz scores zero.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct_count as f64 / self.total as f64
    }
}

/// Scores an attempt.
///
/// An answer is correct when it equals the stored answer after
/// normalization. Unanswered indices count as incorrect. Pure: persisting
/// the breakdown is the caller's job.
pub fn score_quiz(questions: &[Question], answers: &HashMap<usize, String>) -> QuizScore {
    let mut results = Vec::with_capacity(questions.len());
    let mut topics: Vec<TopicBreakdown> = Vec::new();

    for (index, question) in questions.iter().enumerate() {
        let user_answer = answers.get(&index);
        let correct = user_answer.is_some_and(|ans| answers_match(ans, &question.answer));
        let topic = question.topic_or_default();

        let pos = match topics.iter().position(|t| t.topic == topic) {
            Some(pos) => pos,
            None => {
                topics.push(TopicBreakdown {
                    topic: topic.to_string(),
                    score: 0,
                    total: 0,
                    details: Vec::new(),
                });
                topics.len() - 1
            }
        };
        let bucket = &mut topics[pos];
        bucket.total += 1;
        if correct {
            bucket.score += 1;
        }
        bucket.details.push(AnswerDetail {
            question: question.question.clone(),
            user_answer: user_answer.cloned().unwrap_or_default(),
            correct_answer: question.answer.clone(),
            was_correct: correct,
        });

        results.push(QuestionResult {
            index,
            topic: topic.to_string(),
            user_answer: user_answer.cloned(),
            correct_answer: question.answer.clone(),
            correct,
        });
    }

    let correct_count = results.iter().filter(|r| r.correct).count();
    let total = questions.len();
    let percentage = if total == 0 {
        0.0
    } else {
        (correct_count as f64 / total as f64) * 100.0
    };

    QuizScore {
        correct_count,
        total,
        percentage,
        results,
        topics,
    }
}
