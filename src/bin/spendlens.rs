use std::{
    env,
    fs::{File, OpenOptions},
    process::ExitCode,
    sync::{Arc, Mutex},
};

use clap::Parser;
use rusqlite::Connection;
use time::Date;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use spendlens::{
    CategoryName, CategorySet, Error, NliScorer,
    account::Account,
    classify::ScorerConfig,
    db::initialize,
    ingest::{ingest_rows, read_rows},
    stores::{
        AccountStore, TransactionQuery, TransactionStore,
        sqlite::{SQLiteAccountStore, SQLiteTransactionStore},
    },
    summary::spending_summary,
};

/// Ingest a CSV bank statement, categorise each row, and print a spending
/// summary.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// File path to the CSV statement to ingest. The expected header is
    /// `account_no,date,category,amount,description`.
    #[arg(long)]
    csv_path: String,

    /// Only summarise transactions dated on or after this date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    start_date: Option<Date>,

    /// Only summarise transactions dated on or before this date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    end_date: Option<Date>,

    /// The candidate category labels. Defaults to the built-in seven.
    #[arg(long)]
    categories: Option<Vec<String>>,
}

fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Error> {
    let categories = match &args.categories {
        Some(labels) => CategorySet::new(
            labels
                .iter()
                .map(|label| CategoryName::new(label))
                .collect::<Result<Vec<_>, _>>()?,
        )?,
        None => CategorySet::default_labels(),
    };

    let scorer = NliScorer::new(ScorerConfig {
        api_token: env::var("HF_API_TOKEN").ok(),
        ..Default::default()
    })?;

    let connection = Connection::open(&args.db_path)?;
    let is_new_database = connection
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'transactions'")?
        .query_row((), |_| Ok(()))
        .is_err();

    if is_new_database {
        initialize(&connection)?;
    }

    let connection = Arc::new(Mutex::new(connection));
    let mut account_store = SQLiteAccountStore::new(connection.clone());
    let mut transaction_store = SQLiteTransactionStore::new(connection);

    let file = File::open(&args.csv_path).map_err(|error| Error::InvalidCSV(error.to_string()))?;
    let records = read_rows(file)?;

    let mut rows = Vec::new();

    for record in records {
        match record.parsed {
            Ok(row) => rows.push(row),
            Err(reason) => tracing::warn!("skipping line {}: {reason}", record.line),
        }
    }

    // Statements often reference accounts the database has not seen yet.
    for row in &rows {
        match account_store.create(Account::new(&row.account_no, "", 0.0, "imported", 0.0, "")) {
            Ok(_) | Err(Error::DuplicateAccountNumber(_)) => {}
            Err(error) => return Err(error),
        }
    }

    let report = ingest_rows(&mut transaction_store, &scorer, &categories, rows);

    println!(
        "Stored {} transaction(s), {} failed.",
        report.stored.len(),
        report.failed.len()
    );

    for failure in &report.failed {
        println!(
            "  row {} ({:?}): {}",
            failure.line, failure.description, failure.reason
        );
    }

    let mut account_numbers: Vec<String> = Vec::new();

    for transaction in &report.stored {
        if !account_numbers.iter().any(|number| number == transaction.account_no()) {
            account_numbers.push(transaction.account_no().to_string());
        }
    }

    for account_no in account_numbers {
        let stored = transaction_store.get_query(TransactionQuery {
            account_no: Some(account_no.clone()),
            start_date: args.start_date,
            end_date: args.end_date,
            ..Default::default()
        })?;

        println!();
        println!(
            "{}",
            spending_summary(&account_no, &stored, args.start_date, args.end_date)?
        );

        if !account_store.verify_balance(&account_no)? {
            tracing::error!("the cached balance for account {account_no} does not reconcile");
        }
    }

    Ok(())
}

fn parse_date(text: &str) -> Result<Date, String> {
    Date::parse(text, time::macros::format_description!("[year]-[month]-[day]"))
        .map_err(|error| error.to_string())
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}
