pub mod extract;

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::fs_util::sanitize_file_name;

/// Longest snippet returned for an upload, in characters.
pub const SNIPPET_LIMIT: usize = 3000;

pub const IMAGE_PLACEHOLDER: &str =
    "Image uploaded. Ask about it in chat; the file URL is provided.";
pub const AUDIO_VIDEO_PLACEHOLDER: &str = "Audio/video uploaded. Transcription not automatic.";
pub const SAVED_PLACEHOLDER: &str = "Uploaded file saved.";

/// How an upload is turned into a snippet, decided from its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Pdf,
    DocumentText,
    PlainText,
    Image,
    AudioVideo,
    Unknown,
}

impl MediaKind {
    /// Classify a declared MIME type. Earlier rows win, so
    /// `text/x-pdf` is a PDF and `text/msword` a document.
    pub fn from_mime(mime: &str) -> Self {
        if mime.contains("pdf") {
            MediaKind::Pdf
        } else if mime.contains("officedocument") || mime.contains("word") {
            MediaKind::DocumentText
        } else if mime.starts_with("text/") {
            MediaKind::PlainText
        } else if mime.starts_with("image/") {
            MediaKind::Image
        } else if mime.starts_with("audio/") || mime.starts_with("video/") {
            MediaKind::AudioVideo
        } else {
            MediaKind::Unknown
        }
    }
}

/// First `limit` characters of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Produce a snippet (at most [`SNIPPET_LIMIT`] characters) for a saved file.
///
/// Parsing is synchronous and runs on the blocking pool.
pub async fn extract(path: &Path, mime: &str) -> Result<String> {
    let kind = MediaKind::from_mime(mime);
    let path = path.to_path_buf();
    debug!(path = %path.display(), ?kind, "extracting snippet");

    tokio::task::spawn_blocking(move || extract_blocking(&path, kind))
        .await
        .map_err(|e| Error::Internal(format!("extraction task failed: {e}")))?
}

fn extract_blocking(path: &Path, kind: MediaKind) -> Result<String> {
    let snippet = match kind {
        MediaKind::Pdf => truncate_chars(&extract::pdf_text(path)?, SNIPPET_LIMIT),
        MediaKind::DocumentText => truncate_chars(&extract::docx_text(path)?, SNIPPET_LIMIT),
        MediaKind::PlainText => {
            let bytes = std::fs::read(path)?;
            truncate_chars(&String::from_utf8_lossy(&bytes), SNIPPET_LIMIT)
        }
        MediaKind::Image => IMAGE_PLACEHOLDER.to_string(),
        MediaKind::AudioVideo => AUDIO_VIDEO_PLACEHOLDER.to_string(),
        MediaKind::Unknown => SAVED_PLACEHOLDER.to_string(),
    };
    Ok(snippet)
}

/// A file written to the uploads directory.
#[derive(Debug, Clone)]
pub struct SavedUpload {
    /// Name on disk: `<unix-millis>-<original name>`.
    pub stored_name: String,
    pub path: PathBuf,
    /// Name the client sent, as received.
    pub original_name: String,
}

impl SavedUpload {
    /// Public URL under which the file is served.
    pub fn url(&self) -> String {
        format!("/uploads/{}", self.stored_name)
    }
}

/// Write an upload into `dir` under a timestamp-prefixed name.
pub async fn save_upload(dir: &Path, original_name: &str, bytes: &[u8]) -> Result<SavedUpload> {
    let stored_name = format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        sanitize_file_name(original_name)
    );
    let path = dir.join(&stored_name);

    tokio::fs::write(&path, bytes).await.map_err(|e| {
        warn!(path = %path.display(), "failed to save upload: {e}");
        Error::from(e)
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "saved upload");

    Ok(SavedUpload {
        stored_name,
        path,
        original_name: original_name.to_string(),
    })
}

/// MIME type for an upload: the declared one, else a guess from the name.
///
/// Guessing from the name differs from multipart parsers that default an
/// untyped part to `application/octet-stream`; here `report.pdf` sent
/// without a content type is still extracted as a PDF.
pub fn resolve_mime(declared: Option<&str>, file_name: &str) -> String {
    match declared.map(str::trim) {
        Some(mime) if !mime.is_empty() => mime.to_string(),
        _ => mime_guess::from_path(file_name)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default(),
    }
}
