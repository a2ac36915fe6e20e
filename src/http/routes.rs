//! Route configuration for the kiosk API.

use axum::Router;
use axum::http::Method;
use axum::http::header::CONTENT_TYPE;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::app::ports::{DelayPort, DispenseTransport};

use super::handlers::{
    HttpState, dispense_handler, health_handler, refresh_questions_handler, speak_handler,
};

/// Create the full router.  The UI is served from another origin, so
/// CORS is open.
pub fn create_router<T: DispenseTransport, D: DelayPort>(state: HttpState<T, D>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/dispense", post(dispense_handler::<T, D>))
        .route("/speak", post(speak_handler::<T, D>))
        .route(
            "/trigger-fetch-and-prepare",
            post(refresh_questions_handler::<T, D>),
        )
        .layer(cors)
        .with_state(state)
}
