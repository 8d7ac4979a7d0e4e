pub mod client;
pub mod error;
pub mod parse;
pub mod prompt;

pub use client::{LlmClient, QueryGenerator};
pub use error::GenerationError;
pub use parse::{strip_fences, GeneratedQuery};
pub use prompt::GenerationRequest;
