//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::{info, warn};

use super::responses::{AddTimerRequest, ApiError, ApiResponse, HealthResponse, StatusResponse};
use crate::{
    engine::{StartOutcome, StopOutcome},
    error::QueueError,
    state::{AppState, TimerId},
};

type ApiResult = Result<Json<ApiResponse>, ApiError>;

/// Log a rejected command and attach the current queue
fn reject(state: &AppState, command: &str, error: QueueError) -> ApiError {
    warn!("{} rejected: {}", command, error);
    ApiError::new(error, state.snapshot())
}

/// Handle POST /timers - Queue a new timer
pub async fn add_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddTimerRequest>,
) -> ApiResult {
    match state.add_timer(&request.label, &request.duration, request.alarm_enabled) {
        Ok((entry, queue)) => {
            info!("Add endpoint called - queued {:?}", entry.label());
            Ok(Json(ApiResponse::ok(
                format!("Timer {} queued", entry.id()),
                queue,
            )))
        }
        Err(e) => Err(reject(&state, "add", e)),
    }
}

/// Handle DELETE /timers/:id - Remove a timer that is not counting down
pub async fn remove_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = TimerId::new(id);
    match state.remove_timer(&id) {
        Ok((entry, queue)) => Ok(Json(ApiResponse::ok(
            format!("Timer {:?} removed", entry.label()),
            queue,
        ))),
        Err(e) => Err(reject(&state, "remove", e)),
    }
}

/// Handle POST /start - Start or resume the queue
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    match state.start() {
        Ok((outcome, queue)) => {
            let message = match outcome {
                StartOutcome::Started(id) => format!("Timer {} started", id),
                StartOutcome::Resumed(id) => format!("Timer {} resumed", id),
                StartOutcome::Rearmed(id) => {
                    format!("Queue continues after the alarm for {}", id)
                }
            };
            Ok(Json(ApiResponse::ok(message, queue)))
        }
        Err(e) => Err(reject(&state, "start", e)),
    }
}

/// Handle POST /pause - Pause the running timer
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    match state.pause() {
        Ok((entry, queue)) => Ok(Json(ApiResponse::ok(
            format!("Timer {} paused", entry.id()),
            queue,
        ))),
        Err(e) => Err(reject(&state, "pause", e)),
    }
}

/// Handle POST /stop - Reset the active timer and stop the queue
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    match state.stop() {
        Ok((outcome, queue)) => {
            let message = match outcome {
                StopOutcome::Reset(id) => format!("Timer {} stopped and reset", id),
                StopOutcome::Halted => "Queue stopped".to_string(),
            };
            Ok(Json(ApiResponse::ok(message, queue)))
        }
        Err(e) => Err(reject(&state, "stop", e)),
    }
}

/// Handle POST /clear - Remove every timer
pub async fn clear_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    match state.clear_all() {
        Ok((cleared, queue)) => Ok(Json(ApiResponse::ok(
            format!("Cleared {} timers", cleared),
            queue,
        ))),
        Err(e) => Err(reject(&state, "clear", e)),
    }
}

/// Handle GET /status - Return the queue snapshot and server info
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        queue: state.snapshot(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
