use thiserror::Error;

/// Errors raised by either record store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid document file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        DatabaseError::Io { path: path.display().to_string(), source }
    }
}
