// src/models/mod.rs

pub mod learner;
pub mod question;
pub mod quiz;
pub mod quiz_history;
pub mod recommendation;
