//! Implements a SQLite backed account store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    account::Account,
    db::{CreateTable, MapRow},
    stores::AccountStore,
};

/// Tolerance for comparing replayed and cached balances, which accumulate
/// floating point error at different rates.
const BALANCE_EPSILON: f64 = 1e-6;

/// Stores accounts in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteAccountStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteAccountStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl AccountStore for SQLiteAccountStore {
    /// Create a new account in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateAccountNumber] if the account number already
    ///   exists,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, account: Account) -> Result<Account, Error> {
        self.connection
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO accounts
                 (account_no, owner, opening_balance, balance, account_type, interest_rate, reference)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                (
                    account.account_no(),
                    account.owner(),
                    account.opening_balance(),
                    account.balance(),
                    account.account_type(),
                    account.interest_rate(),
                    account.reference(),
                ),
            )
            .map_err(|error| match error {
                // Code 1555 occurs when a PRIMARY KEY constraint failed.
                rusqlite::Error::SqliteFailure(sql_error, Some(_))
                    if sql_error.extended_code == 1555 =>
                {
                    Error::DuplicateAccountNumber(account.account_no().to_string())
                }
                error => error.into(),
            })?;

        Ok(account)
    }

    /// Retrieve an account in the database by its account number.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `account_no` does not refer to a stored
    ///   account,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, account_no: &str) -> Result<Account, Error> {
        let account = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT account_no, owner, opening_balance, balance, account_type, interest_rate, reference
                 FROM accounts WHERE account_no = :account_no",
            )?
            .query_row(&[(":account_no", &account_no)], Self::map_row)?;

        Ok(account)
    }

    /// Check that replaying all stored transactions on top of the opening
    /// balance reproduces the cached balance.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `account_no` does not refer to a stored
    ///   account,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn verify_balance(&self, account_no: &str) -> Result<bool, Error> {
        let (opening_balance, balance, transaction_sum): (f64, f64, f64) = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT a.opening_balance, a.balance,
                        COALESCE((SELECT SUM(t.amount) FROM transactions t
                                  WHERE t.account_no = a.account_no), 0)
                 FROM accounts a WHERE a.account_no = :account_no",
            )?
            .query_row(&[(":account_no", &account_no)], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?;

        Ok((opening_balance + transaction_sum - balance).abs() < BALANCE_EPSILON)
    }
}

impl CreateTable for SQLiteAccountStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE accounts (
                    account_no TEXT PRIMARY KEY,
                    owner TEXT NOT NULL,
                    opening_balance REAL NOT NULL,
                    balance REAL NOT NULL,
                    account_type TEXT NOT NULL,
                    interest_rate REAL NOT NULL DEFAULT 0,
                    reference TEXT
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteAccountStore {
    type ReturnType = Account;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Account::new_unchecked(
            row.get(offset)?,
            row.get(offset + 1)?,
            row.get(offset + 2)?,
            row.get(offset + 3)?,
            row.get(offset + 4)?,
            row.get(offset + 5)?,
            row.get::<_, Option<String>>(offset + 6)?.unwrap_or_default(),
        ))
    }
}
