//! Implements a SQLite backed transaction store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    CategoryName, Error,
    db::{CreateTable, DatabaseID, MapRow},
    stores::{TransactionQuery, TransactionStore},
    transaction::{Transaction, TransactionBuilder},
};

/// Stores transactions in a SQLite database.
///
/// Transactions reference the account table, so
/// [SQLiteAccountStore](crate::stores::sqlite::SQLiteAccountStore) must be
/// set up on the same database and the owning account created before rows
/// are inserted.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// The row insert and the owning account's balance adjustment happen in
    /// one SQL transaction, so no reader observes a stored row whose amount
    /// is missing from the cached balance.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the builder's account does not exist,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let connection = self.connection.lock().unwrap();

        let tx = connection.unchecked_transaction()?;

        let accounts_updated = tx.execute(
            "UPDATE accounts SET balance = balance + ?1 WHERE account_no = ?2",
            (builder.amount, &builder.account_no),
        )?;

        if accounts_updated == 0 {
            return Err(Error::NotFound);
        }

        let transaction = tx
            .prepare(
                "INSERT INTO transactions (account_no, timestamp, amount, category, description)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING id, account_no, timestamp, amount, category, description",
            )?
            .query_row(
                (
                    &builder.account_no,
                    builder.timestamp,
                    builder.amount,
                    builder.category.as_ref().map(|category| category.as_ref()),
                    &builder.description,
                ),
                Self::map_row,
            )?;

        tx.commit()?;

        Ok(transaction)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a stored transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, account_no, timestamp, amount, category, description
                 FROM transactions WHERE id = :id",
            )?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(transaction)
    }

    /// Query for transactions in the database.
    ///
    /// An account scope that was never created simply matches no rows.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidDateRange] if the query's start date is after its
    ///   end date,
    /// - or [Error::SqlError] if there is a SQL error.
    fn get_query(&self, query: TransactionQuery) -> Result<Vec<Transaction>, Error> {
        query.validate()?;

        let mut query_string_parts = vec![
            "SELECT id, account_no, timestamp, amount, category, description FROM transactions"
                .to_string(),
        ];
        let mut where_clause_parts = vec![];
        let mut query_parameters: Vec<Value> = vec![];

        if let Some(account_no) = query.account_no {
            where_clause_parts.push(format!("account_no = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(account_no));
        }

        if let Some(start_date) = query.start_date {
            where_clause_parts.push(format!("date(timestamp) >= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(start_date.to_string()));
        }

        if let Some(end_date) = query.end_date {
            where_clause_parts.push(format!("date(timestamp) <= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(end_date.to_string()));
        }

        if let Some(categories) = query.categories {
            if categories.is_empty() {
                return Ok(Vec::new());
            }

            let placeholders: Vec<String> = categories
                .iter()
                .enumerate()
                .map(|(index, _)| format!("?{}", query_parameters.len() + index + 1))
                .collect();
            where_clause_parts.push(format!("category IN ({})", placeholders.join(", ")));

            for category in categories {
                query_parameters.push(Value::Text(category.to_string()));
            }
        }

        if !where_clause_parts.is_empty() {
            query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        }

        query_string_parts.push("ORDER BY id ASC".to_string());

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE transactions (
                    id INTEGER PRIMARY KEY,
                    account_no TEXT NOT NULL,
                    timestamp TEXT NOT NULL,
                    amount REAL NOT NULL,
                    category TEXT,
                    description TEXT NOT NULL,
                    FOREIGN KEY(account_no) REFERENCES accounts(account_no)
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let account_no = row.get(offset + 1)?;
        let timestamp = row.get(offset + 2)?;
        let amount = row.get(offset + 3)?;
        let category: Option<String> = row.get(offset + 4)?;
        let description = row.get(offset + 5)?;

        Ok(Transaction::new_unchecked(
            id,
            account_no,
            timestamp,
            amount,
            category.as_deref().map(CategoryName::new_unchecked),
            description,
        ))
    }
}
