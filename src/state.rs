// src/state.rs

use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;

use crate::{
    config::Config,
    provider::TextGenerator,
    quiz::{HistoryTracker, QuizGenerator, RecommendationSelector},
    store::QuizStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub history: HistoryTracker,
    pub generator: QuizGenerator,
    pub recommendations: RecommendationSelector,
}

impl AppState {
    /// Wires the engine services over one store and one provider.
    pub fn new(config: Config, store: Arc<dyn QuizStore>, provider: Arc<dyn TextGenerator>) -> Self {
        let timeout = Duration::from_secs(config.provider_timeout_secs);
        Self {
            history: HistoryTracker::new(store.clone()),
            generator: QuizGenerator::new(store.clone(), provider.clone(), timeout),
            recommendations: RecommendationSelector::new(store, provider, timeout),
            config,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for HistoryTracker {
    fn from_ref(state: &AppState) -> Self {
        state.history.clone()
    }
}

impl FromRef<AppState> for QuizGenerator {
    fn from_ref(state: &AppState) -> Self {
        state.generator.clone()
    }
}

impl FromRef<AppState> for RecommendationSelector {
    fn from_ref(state: &AppState) -> Self {
        state.recommendations.clone()
    }
}
