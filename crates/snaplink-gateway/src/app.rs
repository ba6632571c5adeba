use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::{
    create_url_handler, delete_url_handler, fallback_handler, get_url_handler, health_handler,
    method_not_allowed_handler, stats_handler, update_url_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/shorten", post(create_url_handler))
            .route(
                "/shorten/{code}",
                get(get_url_handler)
                    .put(update_url_handler)
                    .delete(delete_url_handler),
            )
            .route("/shorten/{code}/stats", get(stats_handler))
            .fallback(fallback_handler)
            .method_not_allowed_fallback(method_not_allowed_handler)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .with_state(state)
    }
}
