//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{ChatRequest, ChatResponse, ConversationResponse, ErrorResponse, LocationResponse};
use super::AppState;
use crate::runtime::SseEvent;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Conversation snapshot
        .route("/api/conversation", get(get_conversation))
        // User actions
        .route("/api/conversation/chat", post(send_chat))
        // SSE streaming
        .route("/api/conversation/stream", get(stream_conversation))
        // Location status panel
        .route("/api/location", get(get_location))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Conversation
// ============================================================

async fn get_conversation(State(state): State<AppState>) -> Json<ConversationResponse> {
    let conversation = state.session.conversation().await;
    let location = state.session.location().await;

    Json(ConversationResponse {
        messages: conversation.messages,
        pending: conversation.pending,
        last_error: conversation.last_error,
        location,
    })
}

async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    // Empty submissions are a caller-level concern; reject them here, not
    // in the client.
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Message text is required".to_string()));
    }

    // Acceptance is asynchronous: a busy rejection surfaces on the event
    // stream, not on this response.
    state
        .session
        .submit(req.text)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(ChatResponse { queued: true }))
}

async fn stream_conversation(State(state): State<AppState>) -> impl IntoResponse {
    // Subscribe before snapshotting so no update between the two is lost.
    let broadcast_rx = state.session.subscribe();
    let conversation = state.session.conversation().await;
    let location = state.session.location().await;

    sse_stream(
        SseEvent::Init {
            conversation,
            location,
        },
        broadcast_rx,
    )
}

// ============================================================
// Location
// ============================================================

async fn get_location(State(state): State<AppState>) -> Json<LocationResponse> {
    Json(LocationResponse {
        status: state.session.location().await,
    })
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
