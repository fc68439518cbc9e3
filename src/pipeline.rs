//! Turns the expense records for a range of months into one `MonthlyTotals` per month.

use crate::api::ExpenseSource;
use crate::error::Res;
use crate::model::{Expense, MonthRange, MonthlyTotals, NameLookup};
use crate::report::{MonthRecord, Report};
use anyhow::Context;
use tracing::{debug, trace};

/// Sums half of every qualifying expense's cost under the label of the user who is owed money.
///
/// Expenses that are deleted, are settlements, or have no repayments are skipped. Users that are
/// not in `lookup` are labelled with their numeric id.
pub fn aggregate_month<'a>(
    expenses: impl IntoIterator<Item = &'a Expense>,
    lookup: &NameLookup,
) -> MonthlyTotals {
    let mut totals = MonthlyTotals::new();
    for expense in expenses {
        match expense.attribute() {
            Some(attribution) => {
                totals.credit(lookup.label(attribution.to_user), attribution.share());
            }
            None => trace!(
                "Skipping expense {} '{}' (deleted: {}, settlement: {}, repayments: {})",
                expense.id,
                expense.description,
                expense.is_deleted(),
                expense.is_settlement(),
                expense.repayments.len()
            ),
        }
    }
    totals
}

/// Fetches and aggregates each month of `range` in chronological order.
///
/// Months are processed one at a time and the first failure from `source` aborts the whole run, so
/// a `Report` is only ever returned when every month succeeded.
pub async fn run(
    source: &mut (dyn ExpenseSource + Send),
    range: &MonthRange,
    lookup: &NameLookup,
) -> Res<Report> {
    let mut report = Report::default();
    for month in range {
        let bounds = month.bounds();
        debug!(
            "Fetching expenses for {month} ({} to {})",
            bounds.dated_after, bounds.dated_before
        );
        let expenses = source
            .expenses(&bounds)
            .await
            .with_context(|| format!("Unable to fetch the expenses for {month}"))?;
        let totals = aggregate_month(&expenses, lookup);
        debug!(
            "{month}: {} expenses, {} counterparties",
            expenses.len(),
            totals.len()
        );
        report.push(MonthRecord::new(month, totals));
    }
    Ok(report)
}
