//! Defines the account store trait.

use crate::{Error, account::Account};

/// Handles the creation and retrieval of accounts.
pub trait AccountStore {
    /// Create a new account in the store.
    ///
    /// # Errors
    /// This function will return [Error::DuplicateAccountNumber] if an
    /// account with the same number already exists.
    fn create(&mut self, account: Account) -> Result<Account, Error>;

    /// Retrieve an account by its account number.
    ///
    /// # Errors
    /// This function will return [Error::NotFound] if `account_no` does not
    /// refer to a stored account.
    fn get(&self, account_no: &str) -> Result<Account, Error>;

    /// Check the reconciliation invariant for `account_no`: the cached
    /// balance must equal the opening balance plus the sum of all stored
    /// transaction amounts.
    ///
    /// # Errors
    /// This function will return [Error::NotFound] if `account_no` does not
    /// refer to a stored account.
    fn verify_balance(&self, account_no: &str) -> Result<bool, Error>;
}
