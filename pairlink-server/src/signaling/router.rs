use crate::signaling::{SignalingService, append_candidate, get_slot, health, put_description};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(service: SignalingService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(
            "/rooms/{room}/{slot}",
            get(get_slot).put(put_description).post(append_candidate),
        )
        .layer(DefaultBodyLimit::max(service.config().max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}
