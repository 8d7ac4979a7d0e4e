use thiserror::Error;

use crate::database::{DatabaseError, RecordError};
use crate::filter::FilterError;
use crate::update::UpdateError;

/// Failure while running a generated query or mutation against a store
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Update(#[from] UpdateError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("{0} statements are not allowed in query mode")]
    NotAReadStatement(String),
}
