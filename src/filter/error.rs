use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid filter: {0}")]
    InvalidWhereClause(String),

    #[error("Invalid operator data: {0}")]
    InvalidOperatorData(String),

    #[error("Invalid $regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid sort: {0}")]
    InvalidSort(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}
