pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod es;
pub mod ingest;
pub mod models;
pub mod prompt;
pub mod sink;
pub mod source;
