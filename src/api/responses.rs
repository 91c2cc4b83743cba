//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::QueueError, state::QueueSnapshot};

/// Body of `POST /timers`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTimerRequest {
    #[serde(default)]
    pub label: String,
    /// Duration text: `H:MM`, `MM` or `HMM`
    pub duration: String,
    /// Falls back to the stored `default_alarm_enabled` setting
    #[serde(default)]
    pub alarm_enabled: Option<bool>,
}

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    /// Machine-readable error kind, only set on errors
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub queue: QueueSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, queue: QueueSnapshot) -> Self {
        Self {
            status,
            message,
            error: None,
            timestamp: Utc::now(),
            queue,
        }
    }

    /// Create a success response
    pub fn ok(message: String, queue: QueueSnapshot) -> Self {
        Self::new("ok".to_string(), message, queue)
    }

    /// Create an error response
    pub fn error(error: &QueueError, queue: QueueSnapshot) -> Self {
        Self {
            error: Some(error.kind().to_string()),
            ..Self::new("error".to_string(), error.to_string(), queue)
        }
    }
}

/// A rejected command, rendered with the queue as it stands
#[derive(Debug)]
pub struct ApiError {
    pub code: StatusCode,
    pub body: ApiResponse,
}

impl ApiError {
    pub fn new(error: QueueError, queue: QueueSnapshot) -> Self {
        Self {
            code: status_code(&error),
            body: ApiResponse::error(&error, queue),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code, Json(self.body)).into_response()
    }
}

/// HTTP status for each error kind
pub fn status_code(error: &QueueError) -> StatusCode {
    match error {
        QueueError::InvalidFormat(_) | QueueError::InvalidDuration => StatusCode::BAD_REQUEST,
        QueueError::InvalidOperation(_) => StatusCode::CONFLICT,
        QueueError::NotFound(_) => StatusCode::NOT_FOUND,
        QueueError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Enhanced status response with server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub queue: QueueSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
