//! HTTP request handlers

use super::types::{DispatchResponse, ErrorResponse, SessionView, TextRequest};
use super::AppState;
use crate::error::SessionError;
use crate::state_machine::{Action, Event, Response as SessionResponse, Upload};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Optional header carrying the uploaded file's original name
pub const FILE_NAME_HEADER: &str = "x-file-name";

const MAX_USER_ID_LEN: usize = 64;

/// Create the API router
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        // Commands
        .route("/api/users/:user_id/start", post(start_session))
        .route("/api/users/:user_id/cancel", post(cancel_session))
        // User input
        .route("/api/users/:user_id/documents", post(upload_document))
        .route("/api/users/:user_id/actions/:action", post(select_action))
        .route("/api/users/:user_id/text", post(submit_text))
        // Read-only view
        .route("/api/users/:user_id/session", get(get_session))
        // Version
        .route("/version", get(get_version))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

// ============================================================
// Commands
// ============================================================

async fn start_session(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DispatchResponse>, AppError> {
    dispatch(&state, &user_id, Event::Start).await
}

async fn cancel_session(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DispatchResponse>, AppError> {
    dispatch(&state, &user_id, Event::Cancel).await
}

// ============================================================
// User Input
// ============================================================

async fn upload_document(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DispatchResponse>, AppError> {
    validate_user_id(&user_id)?;

    let content = match body {
        Ok(content) => content,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(user_id = %user_id, "Upload over size limit");
            let err = SessionError::InvalidInputKind(
                "That file is too large. Please send a smaller PDF.".to_string(),
            );
            return Ok(Json(DispatchResponse::new(vec![SessionResponse::error(
                &err,
            )])));
        }
        Err(rejection) => return Err(AppError::BadRequest(rejection.body_text())),
    };

    let upload = Upload {
        content: content.to_vec(),
        mime_type: mime_type(&headers),
        file_name: header_str(&headers, FILE_NAME_HEADER).map(str::to_string),
    };
    dispatch(&state, &user_id, Event::DocumentUploaded { upload }).await
}

async fn select_action(
    State(state): State<AppState>,
    Path((user_id, action)): Path<(String, String)>,
) -> Result<Json<DispatchResponse>, AppError> {
    validate_user_id(&user_id)?;

    let action = match action.parse::<Action>() {
        Ok(action) => action,
        Err(e) => {
            tracing::warn!(user_id = %user_id, action = %e.0, "Unknown action");
            let err = SessionError::InvalidInputKind(e.to_string());
            return Ok(Json(DispatchResponse::new(vec![SessionResponse::error(
                &err,
            )])));
        }
    };
    dispatch(&state, &user_id, Event::ActionSelected { action }).await
}

async fn submit_text(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<TextRequest>,
) -> Result<Json<DispatchResponse>, AppError> {
    dispatch(&state, &user_id, Event::TextSubmitted { text: request.text }).await
}

// ============================================================
// Session View
// ============================================================

async fn get_session(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    validate_user_id(&user_id)?;
    let snapshot = state
        .sessions
        .snapshot(&user_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No session for user {user_id}")))?;
    Ok(Json(SessionView::new(user_id, snapshot)))
}

async fn get_version() -> &'static str {
    concat!("pdfdesk ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Helpers
// ============================================================

async fn dispatch(
    state: &AppState,
    user_id: &str,
    event: Event,
) -> Result<Json<DispatchResponse>, AppError> {
    validate_user_id(user_id)?;
    let responses = state.sessions.dispatch(user_id, event).await;
    Ok(Json(DispatchResponse::new(responses)))
}

fn validate_user_id(user_id: &str) -> Result<(), AppError> {
    let valid = !user_id.is_empty()
        && user_id.len() <= MAX_USER_ID_LEN
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid user id: {user_id}")))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Media type from `Content-Type`, without parameters
fn mime_type(headers: &HeaderMap) -> Option<String> {
    header_str(headers, header::CONTENT_TYPE.as_str())
        .and_then(|value| value.split(';').next())
        .map(|essence| essence.trim().to_ascii_lowercase())
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
