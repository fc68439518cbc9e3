//! Types that represent the core data model, such as `Expense`, `Month` and `MonthlyTotals`.
mod amount;
mod expense;
mod lookup;
mod month;
mod totals;

pub use amount::{Amount, AmountError};
pub(crate) use expense::ExpensesResponse;
pub use expense::{Attribution, Expense, Repayment, UserId};
pub use lookup::{NameLookup, MONTH_COLUMN};
pub use month::{DateBounds, Month, MonthIter, MonthRange};
pub use totals::MonthlyTotals;
