//! Exercises both utilities: a failing division that is logged to the sink
//! and handed back as an [`AnnotatedError`].

use thiserror::Error;
use tracing::info;

use crate::{
    annotated::{AnnotatedError, ResultExt},
    logger::LogSink,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,
}

pub fn divide(numerator: i64, denominator: i64) -> Result<i64, ArithmeticError> {
    if denominator == 0 {
        return Err(ArithmeticError::DivisionByZero);
    }
    numerator
        .checked_div(denominator)
        .ok_or(ArithmeticError::Overflow)
}

/// Divide one by zero under `sink`, logging the failure before returning it.
/// The error is located on the division itself.
pub fn run(sink: &LogSink) -> Result<i64, AnnotatedError> {
    sink.in_scope(|| {
        let quotient = divide(1, 0).annotate();
        if quotient.is_err() {
            info!("Divided by zero error occurred");
        }
        quotient
    })
}
