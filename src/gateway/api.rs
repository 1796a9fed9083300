use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

use super::server::AppState;
use crate::error::Error;
use crate::types::{ChatRequest, ChatResponse, UploadResponse};
use crate::upload;

/// Map a chat error to its JSON envelope.
pub fn chat_error_response(err: &Error) -> Response {
    match err {
        Error::Validation(msg) => (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))),
        Error::Configuration(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": msg })),
        ),
        Error::Upstream { body, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "OpenAI error", "detail": body })),
        ),
        Error::Extraction(_) | Error::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Server error" })),
        ),
    }
    .into_response()
}

/// Map an upload error to its JSON envelope. Only validation messages reach
/// the client.
pub fn upload_error_response(err: &Error) -> Response {
    match err {
        Error::Validation(msg) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
        }
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Upload failed" })),
        )
            .into_response(),
    }
}

/// `POST /api/chat`
///
/// The body is parsed leniently: anything that is not a JSON object is
/// treated as an empty request and rejected as a missing message. See
/// [`ChatRequest`] for how field types are coerced.
pub async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request: ChatRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        if !body.is_empty() {
            warn!("unreadable chat body: {e}");
        }
        ChatRequest::default()
    });
    let message = request.message.unwrap_or_default();

    match state
        .relay
        .complete(request.user_id.as_deref(), &message)
        .await
    {
        Ok(reply) => Json(ChatResponse { reply }).into_response(),
        Err(e) => {
            if !matches!(e, Error::Validation(_)) {
                error!("chat failed: {e}");
            }
            chat_error_response(&e)
        }
    }
}

/// `POST /api/upload`
///
/// A request that is not multipart at all is answered like one without a
/// file part.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let result = match multipart {
        Ok(multipart) => handle_upload(&state, multipart).await,
        Err(e) => {
            warn!("rejected upload body: {e}");
            Err(Error::validation("No file"))
        }
    };

    match result {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => {
            if !matches!(e, Error::Validation(_)) {
                warn!("upload failed: {e}");
            }
            upload_error_response(&e)
        }
    }
}

async fn handle_upload(state: &AppState, mut multipart: Multipart) -> Result<UploadResponse, Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Internal(format!("multipart: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime = upload::resolve_mime(field.content_type(), &original_name);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::Internal(format!("multipart: {e}")))?;

        let saved = upload::save_upload(&state.config.server.uploads_dir, &original_name, &bytes)
            .await?;
        let snippet = upload::extract(&saved.path, &mime).await?;

        return Ok(UploadResponse {
            message: "File uploaded".to_string(),
            url: saved.url(),
            filename: saved.original_name,
            snippet,
        });
    }

    Err(Error::validation("No file"))
}
