//! Conversion errors

use thiserror::Error;

pub type ConversionResult<T> = Result<T, ConversionError>;

/// Errors produced by the breakpoint converter
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionError {
    /// Negative, NaN or infinite concentration.
    #[error("PM2.5 concentration {0} is out of domain")]
    OutOfDomain(f64),
}
