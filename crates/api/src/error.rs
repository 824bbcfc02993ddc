use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use kora_core::CoreError;
use kora_pipeline::PipelineError;

use kora_comfyui::wait::WaitError;

/// Application error type for all handler errors.
///
/// Every variant maps to a status code and a stable machine-readable
/// `code`, so callers can distinguish bad input, engine rejection, and
/// timeout without parsing messages.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request payload failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The input image could not be fetched or decoded.
    #[error("Input image error: {0}")]
    InputImage(String),

    /// Domain-level failure (template patching, invariants).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Failure anywhere in the generation pipeline.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::InputImage(_) => (StatusCode::BAD_REQUEST, "INPUT_IMAGE_ERROR"),
            AppError::Core(CoreError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Core(CoreError::MissingNode { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_ERROR")
            }
            AppError::Core(CoreError::Internal(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            AppError::Pipeline(PipelineError::Submit(_)) => {
                (StatusCode::BAD_GATEWAY, "ENGINE_REJECTED")
            }
            AppError::Pipeline(PipelineError::Wait(WaitError::Timeout(_))) => {
                (StatusCode::GATEWAY_TIMEOUT, "ENGINE_TIMEOUT")
            }
            AppError::Pipeline(PipelineError::Wait(WaitError::Execution { .. })) => {
                (StatusCode::BAD_GATEWAY, "ENGINE_ERROR")
            }
            AppError::Pipeline(PipelineError::NoOutput) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "NO_OUTPUT")
            }
            AppError::Pipeline(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Client-caused failures are expected traffic; everything else
        // is worth an operator's attention.
        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        } else {
            tracing::debug!(error = %self, code, "Request rejected");
        }

        // Upstream failures can carry connection details in their
        // sources; only the top-level message goes to the caller.
        let body = Json(json!({
            "error": self.to_string(),
            "code": code,
        }));

        (status, body).into_response()
    }
}
