//! Unified error type for the payout ledger.
//!
//! Every fallible operation in the crate returns [`Result`]. Database errors are
//! wrapped transparently so `?` works directly on `SeaORM` calls.

use sea_orm::DbErr;
use thiserror::Error;

/// All errors the ledger engine and its persistence layer can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable application configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// An amount that is negative, NaN or infinite where that is not allowed.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A project or partner name that is empty or whitespace-only.
    #[error("Invalid name: '{name}' (must not be blank)")]
    InvalidName {
        /// The rejected name
        name: String,
    },

    /// A reporting period that is not weekly, monthly, quarterly or annual.
    #[error("Unknown period '{value}'")]
    UnknownPeriod {
        /// The unrecognized period
        value: String,
    },

    /// A percentage outside `0..=100`.
    #[error("Invalid percentage: {value} (must be between 0 and 100)")]
    InvalidPercentage {
        /// The rejected percentage
        value: f64,
    },

    /// Partner shares on one project add up to more than 100%.
    #[error("Partner shares total {total}% which exceeds 100%")]
    SharesExceedLimit {
        /// The offending total
        total: f64,
    },

    /// The same partner appears twice in one partner list.
    #[error("Partner '{partner_id}' is listed more than once")]
    DuplicatePartner {
        /// The repeated partner id
        partner_id: String,
    },

    /// No project with this id.
    #[error("Project '{id}' not found")]
    ProjectNotFound {
        /// Requested id
        id: String,
    },

    /// No expense with this id.
    #[error("Expense '{id}' not found")]
    ExpenseNotFound {
        /// Requested id
        id: String,
    },

    /// No partner with this id.
    #[error("Partner '{id}' not found")]
    PartnerNotFound {
        /// Requested id
        id: String,
    },

    /// No withdrawal with this id.
    #[error("Withdrawal '{id}' not found")]
    WithdrawalNotFound {
        /// Requested id
        id: String,
    },

    /// A currency code that is not in the rate table.
    #[error("Unknown currency code '{code}'")]
    UnknownCurrency {
        /// The unrecognized code
        code: String,
    },

    /// I/O failure (config file, data directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or unreadable environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
