// src/quiz/mod.rs

pub mod generator;
pub mod history;
pub mod parser;
pub mod recommendation;
pub mod scorer;

pub use generator::{PersonalizedQuiz, QuizGenerator};
pub use history::HistoryTracker;
pub use recommendation::RecommendationSelector;
