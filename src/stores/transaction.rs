//! Defines the transaction store trait.

use time::Date;

use crate::{
    CategoryName, Error,
    db::DatabaseID,
    transaction::{Transaction, TransactionBuilder},
};

/// Handles the creation and retrieval of transactions.
///
/// Stored rows are append-only: implementers expose no update or delete
/// path. Creating a transaction must atomically adjust the owning account's
/// cached balance so that the reconciliation invariant holds at every point
/// a reader can observe.
pub trait TransactionStore {
    /// Create a new transaction in the store and apply its amount to the
    /// owning account's cached balance.
    ///
    /// # Errors
    /// This function will return [Error::NotFound] if the builder's account
    /// does not exist.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Retrieve a transaction from the store by its ID.
    ///
    /// # Errors
    /// This function will return [Error::NotFound] if `id` does not refer to
    /// a stored transaction.
    fn get(&self, id: DatabaseID) -> Result<Transaction, Error>;

    /// Retrieve the transactions matched by `query`.
    ///
    /// A scope that matches nothing (including an account number that was
    /// never created) yields an empty vector, not an error.
    ///
    /// # Errors
    /// This function will return [Error::InvalidDateRange] if the query's
    /// start date is after its end date.
    fn get_query(&self, query: TransactionQuery) -> Result<Vec<Transaction>, Error>;
}

/// Defines which transactions [TransactionStore::get_query] should fetch.
///
/// Every filter is optional; omitted filters are unbounded. Present filters
/// compose with logical AND and the date bounds are inclusive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionQuery {
    /// Include only transactions belonging to this account.
    pub account_no: Option<String>,
    /// Include transactions dated on or after this date.
    pub start_date: Option<Date>,
    /// Include transactions dated on or before this date.
    pub end_date: Option<Date>,
    /// Include only transactions filed under one of these categories.
    pub categories: Option<Vec<CategoryName>>,
}

impl TransactionQuery {
    /// Check that the date bounds are ordered.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if both bounds are present and the
    /// start is after the end.
    pub fn validate(&self) -> Result<(), Error> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && start > end
        {
            return Err(Error::InvalidDateRange { start, end });
        }

        Ok(())
    }
}

#[cfg(test)]
mod transaction_query_tests {
    use time::macros::date;

    use crate::{Error, stores::TransactionQuery};

    #[test]
    fn validate_accepts_default_query() {
        assert_eq!(TransactionQuery::default().validate(), Ok(()));
    }

    #[test]
    fn validate_accepts_equal_bounds() {
        let query = TransactionQuery {
            start_date: Some(date!(2024 - 01 - 15)),
            end_date: Some(date!(2024 - 01 - 15)),
            ..Default::default()
        };

        assert_eq!(query.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_start_after_end() {
        let query = TransactionQuery {
            start_date: Some(date!(2024 - 02 - 01)),
            end_date: Some(date!(2024 - 01 - 01)),
            ..Default::default()
        };

        assert_eq!(
            query.validate(),
            Err(Error::InvalidDateRange {
                start: date!(2024 - 02 - 01),
                end: date!(2024 - 01 - 01),
            })
        );
    }
}
