//! Pure filter and aggregation operations over in-memory transaction rows.
//!
//! These functions never mutate their input; they return fresh vectors so a
//! filtered view can be queried again or handed to the summary layer.

use std::collections::HashMap;

use time::Date;

use crate::{CategoryName, Error, Transaction};

/// The label uncategorized rows are grouped under when aggregating.
///
/// Rows stored through the ingest pipeline always carry a category, so this
/// only shows up for rows injected into a table directly.
pub const UNCATEGORIZED_LABEL: &str = "Other";

/// Select the rows inside the date range that match the category filter.
///
/// Both date bounds are inclusive and an omitted bound is unbounded on that
/// side. `categories`, when present, is a set-membership test; rows without
/// a category never match it. All filters compose with logical AND.
///
/// # Errors
/// This function will return [Error::InvalidDateRange] if both bounds are
/// present and `start_date` is after `end_date`.
pub fn filter(
    rows: &[Transaction],
    start_date: Option<Date>,
    end_date: Option<Date>,
    categories: Option<&[CategoryName]>,
) -> Result<Vec<Transaction>, Error> {
    if let (Some(start), Some(end)) = (start_date, end_date)
        && start > end
    {
        return Err(Error::InvalidDateRange { start, end });
    }

    let filtered = rows
        .iter()
        .filter(|row| {
            let date = row.date();

            if let Some(start) = start_date
                && date < start
            {
                return false;
            }

            if let Some(end) = end_date
                && date > end
            {
                return false;
            }

            match categories {
                Some(wanted) => match row.category() {
                    Some(category) => wanted.contains(category),
                    None => false,
                },
                None => true,
            }
        })
        .cloned()
        .collect();

    Ok(filtered)
}

/// The distinct categories present in `rows`, in first-seen order.
///
/// Rows without a category are skipped. The order follows the underlying
/// row order and is not guaranteed stable across reorderings of the input.
pub fn categories_present(rows: &[Transaction]) -> Vec<CategoryName> {
    let mut seen = Vec::new();

    for row in rows {
        if let Some(category) = row.category()
            && !seen.contains(category)
        {
            seen.push(category.clone());
        }
    }

    seen
}

/// Sum the signed amounts of `rows` per category, sorted by descending
/// expense magnitude (largest expense first, credits last).
///
/// Expenses are negative amounts, so the output is ordered by ascending
/// signed total. Rows without a category are grouped under
/// [UNCATEGORIZED_LABEL], which keeps the per-category totals summing to the
/// same grand total as the input rows.
pub fn aggregate_by_category(rows: &[Transaction]) -> Vec<(CategoryName, f64)> {
    let uncategorized = CategoryName::new_unchecked(UNCATEGORIZED_LABEL);

    let mut totals: HashMap<CategoryName, f64> = HashMap::new();
    let mut first_seen: Vec<CategoryName> = Vec::new();

    for row in rows {
        let category = row.category().unwrap_or(&uncategorized);

        if !totals.contains_key(category) {
            first_seen.push(category.clone());
        }

        *totals.entry(category.clone()).or_insert(0.0) += row.amount();
    }

    let mut aggregated: Vec<(CategoryName, f64)> = first_seen
        .into_iter()
        .map(|category| {
            let total = totals[&category];
            (category, total)
        })
        .collect();

    // Stable sort: categories with equal totals keep first-seen order.
    aggregated.sort_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    aggregated
}
