//! This file defines the `Transaction` type, the core row type of the
//! application, and the builder used to create one.

use time::OffsetDateTime;

use crate::{CategoryName, db::DatabaseID};

/// Money moving in or out of an account.
///
/// Sign convention: a negative `amount` is an expense, a positive `amount`
/// is a credit. The amount is never null and the timestamp always resolves
/// to a calendar date for filtering.
///
/// Transactions are immutable once stored: there is no update path, and rows
/// are only removed by a full table reset.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    id: DatabaseID,
    account_no: String,
    timestamp: OffsetDateTime,
    amount: f64,
    category: Option<CategoryName>,
    description: String,
}

impl Transaction {
    /// Create a transaction from parts that have already been validated,
    /// e.g. a database row.
    pub fn new_unchecked(
        id: DatabaseID,
        account_no: String,
        timestamp: OffsetDateTime,
        amount: f64,
        category: Option<CategoryName>,
        description: String,
    ) -> Self {
        Self {
            id,
            account_no,
            timestamp,
            amount,
            category,
            description,
        }
    }

    /// The ID assigned to the transaction on insert.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The number of the account this transaction belongs to.
    pub fn account_no(&self) -> &str {
        &self.account_no
    }

    /// When the transaction happened.
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    /// The calendar date of the transaction, used by date-range filters.
    pub fn date(&self) -> time::Date {
        self.timestamp.date()
    }

    /// The signed amount: negative for expenses, positive for credits.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// The category the transaction was filed under, if any.
    pub fn category(&self) -> Option<&CategoryName> {
        self.category.as_ref()
    }

    /// The free-text merchant reference or description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for creating a new [Transaction].
///
/// Finalized by [TransactionStore::create](crate::stores::TransactionStore::create),
/// which assigns the ID.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionBuilder {
    pub(crate) account_no: String,
    pub(crate) timestamp: OffsetDateTime,
    pub(crate) amount: f64,
    pub(crate) category: Option<CategoryName>,
    pub(crate) description: String,
}

impl TransactionBuilder {
    /// Start a transaction for `account_no` over the signed `amount`.
    ///
    /// The timestamp defaults to now (UTC); the description is empty and the
    /// category unset until provided.
    pub fn new(account_no: &str, amount: f64) -> Self {
        Self {
            account_no: account_no.to_string(),
            timestamp: OffsetDateTime::now_utc(),
            amount,
            category: None,
            description: String::new(),
        }
    }

    /// Set when the transaction happened.
    pub fn timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the category for the transaction.
    pub fn category(mut self, category: Option<CategoryName>) -> Self {
        self.category = category;
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}
