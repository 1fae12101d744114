// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{history, quiz, recommendation},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (quiz, quiz history, recommendations).
/// * Every route requires a learner bearer token.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
        HeaderValue::from_static("http://localhost:5173"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let quiz_routes = Router::new()
        .route("/generate/custom", post(quiz::generate_custom))
        .route("/generate/personalized", post(quiz::generate_personalized))
        .route("/parse", post(quiz::parse_quiz))
        .route("/submit", post(quiz::submit_quiz));

    let history_routes = Router::new()
        .route("/", get(history::list_history).post(history::save_history))
        .route("/weak-topics", get(history::weak_topics));

    let recommendation_routes = Router::new()
        .route("/", get(recommendation::get_recommendations))
        .route("/generate", post(recommendation::generate_recommendations));

    let api = Router::new()
        .nest("/quiz", quiz_routes)
        .nest("/quiz-history", history_routes)
        .nest("/recommendations", recommendation_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api", api)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
