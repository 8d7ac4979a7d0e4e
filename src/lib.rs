pub mod audit;
pub mod cli;
pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod executor;
pub mod filter;
pub mod generation;
pub mod handlers;
pub mod middleware;
pub mod types;
pub mod update;
