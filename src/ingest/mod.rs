//! Ingests batches of statement rows: categorises each row and stores it.
//!
//! Ingest is all-or-nothing per row, never per batch. A row that fails to
//! categorise or store is reported in the [IngestReport] and the batch
//! carries on, so one bad row in a thousand-line statement does not throw
//! the other 999 away.

mod csv;

pub use self::csv::{RowRecord, read_rows};

use tracing::{debug, warn};

use crate::{
    CategoryName, CategorySet, Error, classify::LabelScorer, stores::TransactionStore,
    transaction::{Transaction, TransactionBuilder},
};

use time::OffsetDateTime;

/// One statement row as handed to the ingest pipeline, before it has an ID
/// or a confirmed category.
#[derive(Clone, Debug, PartialEq)]
pub struct IngestRow {
    /// The account the row belongs to.
    pub account_no: String,
    /// When the transaction happened.
    pub timestamp: OffsetDateTime,
    /// The signed amount: negative for expenses, positive for credits.
    pub amount: f64,
    /// The free-text merchant reference or description.
    pub description: String,
    /// An explicit category, if the statement carried one. When absent the
    /// pipeline infers one from the description.
    pub category: Option<String>,
}

/// Why a row was not stored.
#[derive(Debug, PartialEq)]
pub struct RowFailure {
    /// The 1-based position of the row within the batch.
    pub line: usize,
    /// The row's description, for reporting.
    pub description: String,
    /// The error that stopped the row.
    pub reason: Error,
}

/// The outcome of ingesting a batch: which rows were stored and which
/// failed, and why.
#[derive(Debug, Default, PartialEq)]
pub struct IngestReport {
    /// The stored transactions, in batch order.
    pub stored: Vec<Transaction>,
    /// The rows that could not be stored, in batch order.
    pub failed: Vec<RowFailure>,
}

impl IngestReport {
    /// Whether every row in the batch was stored.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Categorise and store each row in `rows`.
///
/// Rows with an explicit category keep it, provided it is a member of
/// `categories`; rows without one are classified from their description by
/// `scorer`. Each row is stored independently: a failure is recorded in the
/// report and the rest of the batch continues.
pub fn ingest_rows(
    store: &mut impl TransactionStore,
    scorer: &dyn LabelScorer,
    categories: &CategorySet,
    rows: Vec<IngestRow>,
) -> IngestReport {
    let mut report = IngestReport::default();

    for (index, row) in rows.into_iter().enumerate() {
        let line = index + 1;
        let description = row.description.clone();

        match ingest_row(store, scorer, categories, row) {
            Ok(transaction) => {
                debug!(
                    "stored row {line} ({:?}) as transaction {}",
                    description,
                    transaction.id()
                );
                report.stored.push(transaction);
            }
            Err(reason) => {
                warn!("skipping row {line} ({description:?}): {reason}");
                report.failed.push(RowFailure {
                    line,
                    description,
                    reason,
                });
            }
        }
    }

    report
}

fn ingest_row(
    store: &mut impl TransactionStore,
    scorer: &dyn LabelScorer,
    categories: &CategorySet,
    row: IngestRow,
) -> Result<Transaction, Error> {
    let category = resolve_category(scorer, categories, &row)?;

    store.create(
        TransactionBuilder::new(&row.account_no, row.amount)
            .timestamp(row.timestamp)
            .category(Some(category))
            .description(&row.description),
    )
}

/// An explicit category must be a member of the closed set; a missing one is
/// inferred from the description.
fn resolve_category(
    scorer: &dyn LabelScorer,
    categories: &CategorySet,
    row: &IngestRow,
) -> Result<CategoryName, Error> {
    match &row.category {
        Some(name) => {
            let category = CategoryName::new(name)?;

            if categories.contains(&category) {
                Ok(category)
            } else {
                Err(Error::UnknownCategory(category.to_string()))
            }
        }
        None => crate::classify::classify(scorer, &row.description, categories),
    }
}

#[cfg(test)]
mod ingest_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        CategoryName, CategorySet, Error,
        account::Account,
        classify::{LabelScore, LabelScorer},
        db::initialize,
        ingest::{IngestRow, ingest_rows},
        stores::{
            AccountStore, TransactionStore,
            sqlite::{SQLiteAccountStore, SQLiteTransactionStore},
        },
    };

    const ACCOUNT_NO: &str = "12-3405-0123456-50";

    /// Scores "Food" highest for rows mentioning groceries, otherwise
    /// "Transportation".
    struct KeywordScorer;

    impl LabelScorer for KeywordScorer {
        fn score(&self, text: &str, labels: &CategorySet) -> Result<Vec<LabelScore>, Error> {
            let winner = if text.contains("grocery") {
                "Food"
            } else {
                "Transportation"
            };

            Ok(labels
                .iter()
                .map(|label| LabelScore {
                    label: label.clone(),
                    score: if label.as_ref() == winner { 0.9 } else { 0.1 },
                })
                .collect())
        }
    }

    /// Always reports the backing model as down.
    struct UnavailableScorer;

    impl LabelScorer for UnavailableScorer {
        fn score(&self, _text: &str, _labels: &CategorySet) -> Result<Vec<LabelScore>, Error> {
            Err(Error::ModelUnavailable("connection refused".to_string()))
        }
    }

    fn get_store() -> SQLiteTransactionStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        SQLiteAccountStore::new(connection.clone())
            .create(Account::new(ACCOUNT_NO, "user-1", 0.0, "cheque", 0.0, ""))
            .unwrap();

        SQLiteTransactionStore::new(connection)
    }

    fn row(description: &str, amount: f64, category: Option<&str>) -> IngestRow {
        IngestRow {
            account_no: ACCOUNT_NO.to_string(),
            timestamp: datetime!(2024-01-15 09:30 UTC),
            amount,
            description: description.to_string(),
            category: category.map(String::from),
        }
    }

    #[test]
    fn ingest_stores_rows_with_inferred_categories() {
        let mut store = get_store();
        let categories = CategorySet::default_labels();

        let report = ingest_rows(
            &mut store,
            &KeywordScorer,
            &categories,
            vec![
                row("Tesco grocery run", -12.5, None),
                row("Uber to the airport", -34.0, None),
            ],
        );

        assert!(report.is_complete());
        assert_eq!(
            report.stored[0].category(),
            Some(&CategoryName::new_unchecked("Food"))
        );
        assert_eq!(
            report.stored[1].category(),
            Some(&CategoryName::new_unchecked("Transportation"))
        );
    }

    #[test]
    fn ingest_keeps_explicit_categories_without_calling_the_scorer() {
        let mut store = get_store();
        let categories = CategorySet::default_labels();

        // The scorer is down, so a stored row proves it was never consulted.
        let report = ingest_rows(
            &mut store,
            &UnavailableScorer,
            &categories,
            vec![row("Tesco grocery run", -12.5, Some("Food"))],
        );

        assert!(report.is_complete());
        assert_eq!(
            report.stored[0].category(),
            Some(&CategoryName::new_unchecked("Food"))
        );
    }

    #[test]
    fn ingest_rejects_explicit_categories_outside_the_set() {
        let mut store = get_store();
        let categories = CategorySet::default_labels();

        let report = ingest_rows(
            &mut store,
            &KeywordScorer,
            &categories,
            vec![row("Tesco grocery run", -12.5, Some("Groceries"))],
        );

        assert_eq!(report.stored, vec![]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(
            report.failed[0].reason,
            Error::UnknownCategory("Groceries".to_string())
        );
    }

    #[test]
    fn one_bad_row_does_not_abort_the_batch() {
        let mut store = get_store();
        let categories = CategorySet::default_labels();

        let mut bad_row = row("mystery charge", -5.0, None);
        bad_row.account_no = "99-9999-9999999-99".to_string();

        let report = ingest_rows(
            &mut store,
            &KeywordScorer,
            &categories,
            vec![
                row("Tesco grocery run", -12.5, None),
                bad_row,
                row("Uber to the airport", -34.0, None),
            ],
        );

        assert_eq!(report.stored.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].line, 2);
        assert_eq!(report.failed[0].reason, Error::NotFound);
    }

    #[test]
    fn scorer_outage_fails_only_the_rows_that_needed_it() {
        let mut store = get_store();
        let categories = CategorySet::default_labels();

        let report = ingest_rows(
            &mut store,
            &UnavailableScorer,
            &categories,
            vec![
                row("Tesco grocery run", -12.5, Some("Food")),
                row("mystery charge", -5.0, None),
            ],
        );

        assert_eq!(report.stored.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(
            report.failed[0].reason,
            Error::ModelUnavailable("connection refused".to_string())
        );
    }
}
