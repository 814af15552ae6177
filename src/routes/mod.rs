// Export all route modules
pub mod blockchain;
pub mod currency;
pub mod marketplace;
pub mod onboarding;
pub mod proposals;

// Re-export all route handlers for easy importing
pub use blockchain::*;
pub use currency::*;
pub use marketplace::*;
pub use onboarding::*;
pub use proposals::*;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

/// `{success, message, count, data}` body shared by successful responses.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// Unwraps a JSON body, turning extractor rejections into a JSON 400.
pub(crate) fn json_object(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    match payload {
        Ok(Json(value)) if value.is_object() => Ok(value),
        Ok(_) => Err(AppError::InvalidRequest("request body must be a JSON object".to_string())),
        Err(rejection) => Err(AppError::InvalidRequest(rejection.body_text())),
    }
}
