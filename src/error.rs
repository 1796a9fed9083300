use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the relay and the upload extractor.
///
/// Every variant is converted to a JSON error envelope at the HTTP boundary;
/// see `gateway::server` for the status mapping.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing caller input.
    #[error("{0}")]
    Validation(String),

    /// Deployment misconfiguration, e.g. no API key.
    #[error("{0}")]
    Configuration(String),

    /// The completion API answered with a non-success status.
    #[error("completion API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// A document could not be parsed.
    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn extraction(err: impl std::fmt::Display) -> Self {
        Self::Extraction(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Internal(format!("completion request failed: {err}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("io: {err}"))
    }
}
