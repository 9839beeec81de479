//! Spendlens is the core of a personal finance backend: it ingests bank
//! statement rows, infers a category for each transaction with a zero-shot
//! classifier, and answers filter and per-category aggregation queries over
//! the stored transactions.
//!
//! The HTTP layer, authentication and the chat assistant live outside this
//! crate; they talk to it through [ingest], the [stores] traits and
//! [summary::spending_summary].

#![warn(missing_docs)]

use time::Date;

pub mod account;
pub mod category;
pub mod classify;
pub mod db;
pub mod ingest;
pub mod session;
pub mod stores;
pub mod summary;
pub mod table;
pub mod transaction;

pub use account::Account;
pub use category::{CategoryName, CategorySet};
pub use classify::{LabelScore, LabelScorer, NliScorer, classify};
pub use session::{SessionId, SessionStore};
pub use transaction::{Transaction, TransactionBuilder};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A classification request was made with empty or whitespace-only text.
    ///
    /// Scoring an empty string against the label set would silently produce
    /// garbage, so the request is rejected up front.
    #[error("cannot classify empty text")]
    EmptyInput,

    /// A category set was created with no labels.
    #[error("the category set must contain at least one label")]
    EmptyCategorySet,

    /// A category set was created with the same label twice.
    #[error("the label \"{0}\" appears more than once in the category set")]
    DuplicateCategory(String),

    /// A row carried a category that is not a member of the configured
    /// category set.
    ///
    /// The category set is a closed world: every stored category must be one
    /// of its labels.
    #[error("\"{0}\" is not a member of the configured category set")]
    UnknownCategory(String),

    /// The scoring backend was unreachable, timed out, or returned an
    /// unusable response.
    ///
    /// The caller decides the fallback; a common choice is filing the row
    /// under a catch-all category or reporting the row as failed.
    #[error("the scoring model is unavailable: {0}")]
    ModelUnavailable(String),

    /// A date range was given with the start date after the end date.
    ///
    /// Silently returning an empty result here would hide caller bugs, so
    /// the range is rejected instead.
    #[error("start date {start} is after end date {end}")]
    InvalidDateRange {
        /// The start of the rejected range.
        start: Date,
        /// The end of the rejected range.
        end: Date,
    },

    /// A date in the past was used for a balance projection.
    #[error("{0} is in the past; balance projections need a future date")]
    PastDate(Date),

    /// The CSV had issues that prevented it from being parsed.
    #[error("could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The specified account number already exists in the database.
    #[error("the account \"{0}\" already exists in the database")]
    DuplicateAccountNumber(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
