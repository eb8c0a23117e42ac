//! HTTP surface: JSON API over the per-session core

mod error;
mod handlers;
mod session;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::completion::CompletionService;
use crate::config::Config;
use crate::session::SessionStore;

pub use error::AppError;
pub use session::{CurrentSession, SESSION_COOKIE_NAME};

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub completion: Arc<dyn CompletionService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, completion: Arc<dyn CompletionService>) -> Self {
        Self {
            sessions: SessionStore::with_limits(
                config.server.session_idle_timeout(),
                config.server.max_sessions,
            ),
            completion,
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/session",
            get(handlers::session_snapshot).delete(handlers::end_session),
        )
        .route("/module", post(handlers::select_module))
        .route(
            "/journal",
            get(handlers::list_journal).post(handlers::submit_journal),
        )
        .route("/assessment", get(handlers::assessment_state))
        .route("/assessment/questions", post(handlers::load_questions))
        .route(
            "/assessment/questions/generate",
            post(handlers::generate_questions),
        )
        .route("/assessment/answers/:index", put(handlers::record_answer))
        .route("/assessment/submit", post(handlers::submit_assessment))
        .route("/assessment/reset", post(handlers::reset_assessment))
        .route("/report", get(handlers::report))
        .route("/report/feedback", post(handlers::generate_feedback))
        .route("/report/fallback", get(handlers::fallback_feedback))
        .route("/report/download", get(handlers::download_report))
        .route("/clear", post(handlers::clear_all))
        .route("/literacy", get(handlers::literacy_modules))
        .route("/literacy/:module/select", post(handlers::select_literacy_module))
        .route(
            "/literacy/:module/tasks/:index",
            put(handlers::set_literacy_task),
        )
        .route("/challenges", get(handlers::list_challenges))
        .route("/challenges/:kind/select", post(handlers::select_challenge))
        .route("/challenges/:kind/submit", post(handlers::submit_challenge))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::attach_session,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
