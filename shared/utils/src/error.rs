use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum InvoiceError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Unusable model output: {message}")]
    ModelOutput { message: String, raw: String },

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("PDF rendering error: {message}")]
    Rendering { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

/// Longest excerpt of a bad model response kept on the error.
const RAW_EXCERPT_CHARS: usize = 500;

impl InvoiceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn model_output(message: impl Into<String>, raw: &str) -> Self {
        Self::ModelOutput {
            message: message.into(),
            raw: raw.chars().take(RAW_EXCERPT_CHARS).collect(),
        }
    }

    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn rendering(message: impl Into<String>) -> Self {
        Self::Rendering {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::ModelOutput { .. } => "MODEL_OUTPUT_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Storage { .. } => "STORAGE_ERROR",
            Self::Rendering { .. } => "RENDERING_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::ModelOutput { .. } => 422,
            Self::ExternalService { .. } => 502,
            Self::Storage { .. } => 500,
            Self::Rendering { .. } => 500,
            Self::Configuration { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }
}

pub type InvoiceResult<T> = Result<T, InvoiceError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<InvoiceError> for ErrorResponse {
    fn from(error: InvoiceError) -> Self {
        let details = match &error {
            InvoiceError::ModelOutput { raw, .. } => Some(serde_json::json!({ "raw": raw })),
            _ => None,
        };
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            details,
        }
    }
}

impl IntoResponse for InvoiceError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

// Conversion from common error types
impl From<reqwest::Error> for InvoiceError {
    fn from(error: reqwest::Error) -> Self {
        Self::external_service("LLM API", error.to_string())
    }
}

impl From<serde_json::Error> for InvoiceError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<std::io::Error> for InvoiceError {
    fn from(error: std::io::Error) -> Self {
        Self::storage(error.to_string())
    }
}

impl From<validator::ValidationErrors> for InvoiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::validation("invoice", crate::validation::format_validation_errors(&errors))
    }
}
