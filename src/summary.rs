//! Renders a plain-text spending summary for an account.
//!
//! The chat assistant lives outside this crate; this module is the seam it
//! pulls context through. The output is deliberately plain text so it can be
//! dropped into a prompt or printed to a terminal unchanged.

use time::Date;

use crate::{Error, Transaction, table};

/// Summarise the spending in `rows` for `account_no` over the (inclusive,
/// optional) date range as plain-text lines.
///
/// Per-category totals are listed largest expense first, followed by a net
/// total over the whole range. The summary reflects only the rows given;
/// callers scope them to the account beforehand.
///
/// # Errors
/// This function will return [Error::InvalidDateRange] if both bounds are
/// present and `start` is after `end`.
pub fn spending_summary(
    account_no: &str,
    rows: &[Transaction],
    start: Option<Date>,
    end: Option<Date>,
) -> Result<String, Error> {
    let in_range = table::filter(rows, start, end, None)?;

    let mut lines = vec![match (start, end) {
        (Some(start), Some(end)) => {
            format!("Spending for account {account_no} from {start} to {end}:")
        }
        (Some(start), None) => format!("Spending for account {account_no} since {start}:"),
        (None, Some(end)) => format!("Spending for account {account_no} up to {end}:"),
        (None, None) => format!("Spending for account {account_no}:"),
    }];

    if in_range.is_empty() {
        lines.push("  (no transactions in range)".to_string());
        return Ok(lines.join("\n"));
    }

    for (category, total) in table::aggregate_by_category(&in_range) {
        lines.push(format!("  {category}: {total:.2}"));
    }

    let net: f64 = in_range.iter().map(Transaction::amount).sum();
    lines.push(format!(
        "Net over {} transaction(s): {net:.2}",
        in_range.len()
    ));

    Ok(lines.join("\n"))
}
