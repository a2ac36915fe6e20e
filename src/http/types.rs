//! Request and response types for the kiosk HTTP API.
//!
//! Bodies and status codes are the ones the trivia UI already parses, so
//! the strings here are part of the contract.

use axum::Json;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::app::service::DispenseOutcome;

pub const INVALID_CANDY: &str = "Invalid candy type received";
pub const ACK_TIMEOUT: &str = "Timeout waiting for Arduino ack";
pub const I2C_FAILED: &str = "I2C communication failed";
pub const NO_TEXT: &str = "No text provided";
pub const SPEECH_FAILED: &str = "Speech synthesis failed";
pub const QUESTIONS_UPDATED: &str = "Question set downloaded & updated!";

// ═══════════════════════════════════════════════════════════════
// Requests
// ═══════════════════════════════════════════════════════════════

/// Body of `POST /dispense`.
#[derive(Debug, Clone, Deserialize)]
pub struct DispenseRequest {
    #[serde(rename = "candyType", default)]
    pub candy_type: Option<String>,
}

/// Body of `POST /speak`.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeakRequest {
    #[serde(default)]
    pub text: Option<String>,
}

// ═══════════════════════════════════════════════════════════════
// Responses
// ═══════════════════════════════════════════════════════════════

/// Response for `/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Either body the dispense endpoints can return.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ApiBody {
    Success(SuccessResponse),
    Error(ErrorResponse),
}

impl ApiBody {
    pub fn success() -> Self {
        Self::Success(SuccessResponse { success: true })
    }

    pub fn error(msg: &str) -> Self {
        Self::Error(ErrorResponse {
            error: msg.to_string(),
        })
    }
}

/// Status and body for a dispense outcome.
pub fn dispense_response(outcome: &DispenseOutcome) -> (StatusCode, Json<ApiBody>) {
    match outcome {
        DispenseOutcome::Acknowledged { .. } => (StatusCode::OK, Json(ApiBody::success())),
        DispenseOutcome::InvalidSelection { .. } => {
            (StatusCode::BAD_REQUEST, Json(ApiBody::error(INVALID_CANDY)))
        }
        DispenseOutcome::TimedOut { .. } => {
            (StatusCode::GATEWAY_TIMEOUT, Json(ApiBody::error(ACK_TIMEOUT)))
        }
        DispenseOutcome::TransportUnavailable { .. } | DispenseOutcome::TransportError { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiBody::error(I2C_FAILED)))
        }
    }
}
