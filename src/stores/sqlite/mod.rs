//! SQLite-backed implementations of the store traits.

mod account;
mod transaction;

pub use account::SQLiteAccountStore;
pub use transaction::SQLiteTransactionStore;
