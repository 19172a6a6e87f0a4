//! Application-wide error types.

use thiserror::Error;

use crate::annotated::AnnotatedError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Annotated(#[from] AnnotatedError),
}
