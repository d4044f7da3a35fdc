use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry of the error envelope returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `E_OVERLAPPING_SCHEDULES`.
    pub code: String,
    pub message: String,
    /// Dotted path of the offending input field, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Body shape shared by all error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub errors: Vec<ErrorDetail>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Validation failed with {} error(s)", .0.len())]
    Validation(Vec<ErrorDetail>),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    pub fn validation(detail: ErrorDetail) -> Self {
        AppError::Validation(vec![detail])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_envelope(self) -> ErrorEnvelope {
        let errors = match self {
            AppError::NotFound(msg) => vec![ErrorDetail::new("E_NOT_FOUND", msg)],
            AppError::Validation(details) => details,
            AppError::Internal(msg) => vec![ErrorDetail::new("E_INTERNAL", msg)],
            AppError::Database(msg) => vec![ErrorDetail::new("E_DATABASE", msg)],
        };
        ErrorEnvelope { errors }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Error: {}: {}", status, self);
        } else {
            tracing::warn!("Error: {}: {}", status, self);
        }

        (status, Json(self.into_envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn envelope_of(response: Response) -> ErrorEnvelope {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn validation_errors_map_to_422_with_every_detail() {
        let error = AppError::Validation(vec![
            ErrorDetail::new("E_REQUIRED", "nombre_completo is required").with_field("nombre_completo"),
            ErrorDetail::new("E_REQUIRED", "especialidad is required").with_field("especialidad"),
        ]);

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let envelope = envelope_of(response).await;
        assert_eq!(envelope.errors.len(), 2);
        assert_eq!(envelope.errors[1].field.as_deref(), Some("especialidad"));
    }

    #[tokio::test]
    async fn not_found_uses_the_same_envelope() {
        let response = AppError::NotFound("Specialist not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let envelope = envelope_of(response).await;
        assert_eq!(envelope.errors, vec![ErrorDetail::new("E_NOT_FOUND", "Specialist not found")]);
    }

    #[test]
    fn field_is_omitted_when_absent() {
        let json = serde_json::to_value(ErrorDetail::new("E_INTERNAL", "boom")).unwrap();
        assert!(json.get("field").is_none());
    }
}
