pub mod types;
pub mod expr;
pub mod apply;
pub mod error;

pub use types::{Num, UpdateOp, UpdateSpec};
pub use apply::UpdateApplier;
pub use error::{ExprError, UpdateError};
