pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod report;

pub use error::{AppError, FetchError, FetchErrorKind, Result};
