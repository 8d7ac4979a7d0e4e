pub mod audit;
pub mod query;
pub mod store;
