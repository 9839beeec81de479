//! This file defines the `Account` type.
//!
//! Accounts are immutable value structs constructed fully at creation time;
//! the cached balance is only changed by the stores, transactionally with
//! each inserted transaction.

use time::Date;

use crate::Error;

/// A bank account that owns transactions.
///
/// `balance` is a cached figure maintained by the transaction store: every
/// stored transaction adjusts it in the same database transaction as the
/// insert. Replaying all transactions on top of `opening_balance` must
/// always reproduce it (the reconciliation invariant).
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    account_no: String,
    owner: String,
    opening_balance: f64,
    balance: f64,
    account_type: String,
    interest_rate: f64,
    reference: String,
}

impl Account {
    /// Create an account. The cached balance starts at the opening balance.
    pub fn new(
        account_no: &str,
        owner: &str,
        opening_balance: f64,
        account_type: &str,
        interest_rate: f64,
        reference: &str,
    ) -> Self {
        Self {
            account_no: account_no.to_string(),
            owner: owner.to_string(),
            opening_balance,
            balance: opening_balance,
            account_type: account_type.to_string(),
            interest_rate,
            reference: reference.to_string(),
        }
    }

    /// Create an account from parts that have already been validated,
    /// e.g. a database row.
    pub fn new_unchecked(
        account_no: String,
        owner: String,
        opening_balance: f64,
        balance: f64,
        account_type: String,
        interest_rate: f64,
        reference: String,
    ) -> Self {
        Self {
            account_no,
            owner,
            opening_balance,
            balance,
            account_type,
            interest_rate,
            reference,
        }
    }

    /// The unique account number.
    pub fn account_no(&self) -> &str {
        &self.account_no
    }

    /// The identifier of the account's owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The balance the account was created with.
    pub fn opening_balance(&self) -> f64 {
        self.opening_balance
    }

    /// The cached balance after all stored transactions.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// The kind of account, e.g. "savings".
    pub fn account_type(&self) -> &str {
        &self.account_type
    }

    /// The monthly interest rate, as a fraction.
    pub fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    /// A free-text reference for the account.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Project the balance at a future date from the current balance and the
    /// monthly interest rate, compounding once per whole month between
    /// `today` and `at`.
    ///
    /// # Errors
    /// This function will return [Error::PastDate] if `at` is before
    /// `today`.
    pub fn projected_balance(&self, at: Date, today: Date) -> Result<f64, Error> {
        if at < today {
            return Err(Error::PastDate(at));
        }

        if self.balance == 0.0 || self.interest_rate == 0.0 {
            return Ok(self.balance);
        }

        let months = (at.year() - today.year()) * 12 + (at.month() as i32 - today.month() as i32);

        Ok(self.balance * (1.0 + self.interest_rate).powi(months))
    }
}
