pub mod error;
pub mod mutation;
pub mod read;
pub mod request;
pub mod sql;

pub use error::ExecutionError;
pub use mutation::MutationExecutor;
pub use read::{ReadExecutor, DOCUMENT_IDENTITY_KEY};
pub use request::{MutationMethod, MutationOutcome, MutationRequest, ReadQuery};
pub use sql::SqlStatementKind;
