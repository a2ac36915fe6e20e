//! HTTP request handlers for the kiosk API.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};

use crate::adapters::process::{Narrator, QuestionBankRefresher};
use crate::app::ports::{DelayPort, DispenseTransport};
use crate::app::service::DispenseService;

use super::types::{
    ApiBody, DispenseRequest, HealthResponse, I2C_FAILED, NO_TEXT, QUESTIONS_UPDATED,
    SPEECH_FAILED, SpeakRequest, dispense_response,
};

/// Shared state handed to every handler.
pub struct HttpState<T: DispenseTransport, D: DelayPort> {
    pub dispenser: Arc<DispenseService<T, D>>,
    pub narrator: Arc<Narrator>,
    pub questions: Arc<QuestionBankRefresher>,
}

impl<T: DispenseTransport, D: DelayPort> Clone for HttpState<T, D> {
    fn clone(&self) -> Self {
        Self {
            dispenser: Arc::clone(&self.dispenser),
            narrator: Arc::clone(&self.narrator),
            questions: Arc::clone(&self.questions),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Health
// ═══════════════════════════════════════════════════════════════

/// Handler for `GET /health`.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// ═══════════════════════════════════════════════════════════════
// Dispense
// ═══════════════════════════════════════════════════════════════

/// Handler for `POST /dispense`.
///
/// A missing or malformed body is an invalid selection.  The handshake
/// runs on its own task: once the byte is on the bus, a client hanging
/// up must not cut the poll loop short.
pub async fn dispense_handler<T: DispenseTransport, D: DelayPort>(
    State(state): State<HttpState<T, D>>,
    body: Result<Json<DispenseRequest>, JsonRejection>,
) -> Response {
    let token = match body {
        Ok(Json(req)) => req.candy_type.unwrap_or_default(),
        Err(rejection) => {
            warn!("Unreadable dispense request: {}", rejection);
            String::new()
        }
    };

    let dispenser = Arc::clone(&state.dispenser);
    match tokio::spawn(async move { dispenser.dispense(&token).await }).await {
        Ok(outcome) => dispense_response(&outcome).into_response(),
        Err(e) => {
            error!("Dispense task aborted: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiBody::error(I2C_FAILED))).into_response()
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Narration & question bank
// ═══════════════════════════════════════════════════════════════

/// Handler for `POST /speak`.
pub async fn speak_handler<T: DispenseTransport, D: DelayPort>(
    State(state): State<HttpState<T, D>>,
    body: Result<Json<SpeakRequest>, JsonRejection>,
) -> Response {
    let text = body
        .ok()
        .and_then(|Json(req)| req.text)
        .filter(|t| !t.trim().is_empty());
    let Some(text) = text else {
        return (StatusCode::BAD_REQUEST, Json(ApiBody::error(NO_TEXT))).into_response();
    };

    match state.narrator.speak(&text).await {
        Ok(()) => Json(ApiBody::success()).into_response(),
        Err(e) => {
            error!("Speech synthesis failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiBody::error(SPEECH_FAILED))).into_response()
        }
    }
}

/// Handler for `POST /trigger-fetch-and-prepare`.
pub async fn refresh_questions_handler<T: DispenseTransport, D: DelayPort>(
    State(state): State<HttpState<T, D>>,
) -> Response {
    match state.questions.refresh().await {
        Ok(_) => (StatusCode::OK, QUESTIONS_UPDATED).into_response(),
        Err(e) => {
            error!("Question refresh failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}")).into_response()
        }
    }
}
