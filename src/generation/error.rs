use thiserror::Error;

/// The generator failed or produced output we cannot use
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generator API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed generator response: {0}")]
    MalformedResponse(String),

    #[error("Generator returned no query")]
    EmptyOutput,

    #[error("Invalid JSON from generator: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON object, got {0}")]
    NotAnObject(String),

    #[error("Unknown method: {0:?}")]
    UnknownMethod(String),
}
