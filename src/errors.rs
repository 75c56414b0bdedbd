//! Unified error types for the ledger.
//!
//! Every fallible operation in the crate returns [`Result`]. Input problems are
//! reported as [`ValidationError`] inside [`Error::Validation`]; persistence
//! failures propagate as [`Error::Store`] instead of being swallowed.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all ledger operations.
#[derive(Debug, Error)]
pub enum Error {
    /// User input was missing or malformed. No state was changed.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// An edit targeted a record id that does not exist.
    #[error("Record {id} not found")]
    RecordNotFound {
        /// The id that was looked up
        id: i64,
    },

    /// Export was requested while the ledger is empty. No file was written.
    #[error("There are no records to export")]
    NoData,

    /// Writing the spreadsheet failed.
    #[error("Failed to export ledger to {path:?}: {source}")]
    Export {
        /// Destination the export was aimed at
        path: PathBuf,
        /// Underlying spreadsheet or file system failure
        source: ExportFailure,
    },

    /// The database rejected or failed an operation.
    #[error("Store error: {0}")]
    Store(#[from] sea_orm::DbErr),

    /// The settings file could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// A console line could not be turned into a command.
    #[error("Command error: {message}")]
    Command {
        /// Human-readable description of the problem
        message: String,
    },

    /// Console I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a record draft is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name or amount was left blank.
    #[error("missing name or amount")]
    MissingNameOrAmount,

    /// Amount text is not an integer.
    #[error("amount not numeric: {input:?}")]
    AmountNotNumeric {
        /// The rejected text
        input: String,
    },

    /// Meal-ticket text is not an integer.
    #[error("meal not numeric: {input:?}")]
    MealNotNumeric {
        /// The rejected text
        input: String,
    },

    /// Amounts and meal-ticket counts cannot go below zero.
    #[error("{field} cannot be negative (got {value})")]
    NegativeValue {
        /// Which field was negative
        field: &'static str,
        /// The parsed value
        value: i64,
    },

    /// Amounts and meal-ticket counts have an upper bound.
    #[error("{field} exceeds {max} (got {value})")]
    TooLarge {
        /// Which field was too large
        field: &'static str,
        /// The parsed value
        value: i64,
        /// Largest accepted value
        max: i64,
    },

    /// Category text does not name a known category.
    #[error("unknown category: {input:?}")]
    UnknownCategory {
        /// The rejected text
        input: String,
    },
}

/// The lower-level failure behind an [`Error::Export`].
#[derive(Debug, Error)]
pub enum ExportFailure {
    /// The spreadsheet writer failed.
    #[error("spreadsheet encoding failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Moving the finished file into place failed.
    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
