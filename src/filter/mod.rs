pub mod types;
pub mod compare;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod error;

pub use types::*;
pub use filter::Filter;
pub use filter_where::Predicate;
pub use error::FilterError;
