//! Invoice Format - text formatting for invoice documents
//!
//! This crate provides:
//! - Currency formatting with ISO 4217 code validation (`$1,234.56`, `CHF 12.00`)
//! - Grouped decimal rendering from `#,###.##` patterns
//! - Calendar date formatting (`January 15, 2024`)
//!
//! # Example
//!
//! ```ignore
//! use invoice_format::{format_calendar_date, format_currency_or_fallback};
//!
//! let total = format_currency_or_fallback(115.0, "USD"); // "$115.00"
//! let bad = format_currency_or_fallback(7.5, "XXX-INVALID"); // "XXX-INVALID 7.50"
//! ```

mod date;
mod money;

pub use date::format_calendar_date;
pub use money::{format_currency, format_currency_or_fallback, minor_units, render_float};

use thiserror::Error;

/// Errors that can occur while formatting values
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),

    #[error("Amount is not a finite number: {0}")]
    NonFiniteAmount(f64),
}

/// Result type for formatting operations
pub type Result<T> = std::result::Result<T, FormatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_usd() {
        assert_eq!(format_currency(115.0, "USD").unwrap(), "$115.00");
    }

    #[test]
    fn test_invalid_currency_message() {
        let err = FormatError::InvalidCurrency("XXX-INVALID".to_string());
        assert_eq!(err.to_string(), "Invalid currency code: \"XXX-INVALID\"");
    }
}
