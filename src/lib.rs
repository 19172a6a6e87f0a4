//! Library root — exposes internals for integration tests and the demo binary.
//! The binary entry point is src/main.rs.

pub mod annotated;
pub mod config;
pub mod demo;
pub mod error;
pub mod logger;

pub use annotated::{AnnotatedError, ResultExt, SourceLocation};
pub use error::AppError;
