//! Implements the `ExpenseSource` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without calling the Splitwise API.

use crate::api::ExpenseSource;
use crate::error::Res;
use crate::model::{DateBounds, Expense, ExpensesResponse, Month};
use anyhow::Context;
use std::collections::BTreeMap;
use std::str::FromStr;

/// An implementation of `ExpenseSource` that does not use the network. It holds expenses per month
/// in memory and, by default, is seeded with the data in this module.
#[derive(Debug, Clone)]
pub struct TestSource {
    data: BTreeMap<Month, Vec<Expense>>,
    calls: Vec<DateBounds>,
}

impl TestSource {
    /// Create a new `TestSource` that will return `data[month]` for each month requested. Months
    /// that are not in `data` have no expenses.
    pub fn new(data: BTreeMap<Month, Vec<Expense>>) -> Self {
        Self {
            data,
            calls: Vec::new(),
        }
    }

    /// The bounds of every request received so far, in order.
    pub fn calls(&self) -> &[DateBounds] {
        &self.calls
    }
}

#[async_trait::async_trait]
impl ExpenseSource for TestSource {
    async fn expenses(&mut self, bounds: &DateBounds) -> Res<Vec<Expense>> {
        self.calls.push(bounds.clone());
        let month_key = bounds
            .dated_after
            .get(..7)
            .with_context(|| format!("Unexpected dated_after '{}'", bounds.dated_after))?;
        let month = Month::from_str(month_key)?;
        Ok(self.data.get(&month).cloned().unwrap_or_default())
    }
}

impl Default for TestSource {
    /// Loads seed data from this module.
    fn default() -> Self {
        Self::new(default_data())
    }
}

/// Provides the seed data from this module.
fn default_data() -> BTreeMap<Month, Vec<Expense>> {
    let seed: BTreeMap<Month, ExpensesResponse> =
        serde_json::from_str(SEED_DATA).expect("seed data is valid JSON");
    seed.into_iter().map(|(m, r)| (m, r.expenses)).collect()
}

/// Seed expense data, keyed by month, in the shape that the service returns. Users 100 and 200
/// share costs with user 1; user 300 is not in the usual lookup.
const SEED_DATA: &str = r##"{
  "2021-10": {
    "expenses": [
      {"id": 1001, "description": "Groceries", "date": "2021-10-03T18:00:00Z", "cost": "84.20",
       "currency_code": "USD", "payment": false, "deleted_at": null,
       "repayments": [{"from": 1, "to": 100, "amount": "42.10"}]},
      {"id": 1002, "description": "Electric bill", "date": "2021-10-12T09:00:00Z", "cost": "120.00",
       "currency_code": "USD", "payment": false, "deleted_at": null,
       "repayments": [{"from": 1, "to": 200, "amount": "60.00"}]},
      {"id": 1003, "description": "Settle up", "date": "2021-10-20T09:00:00Z", "cost": "60.00",
       "currency_code": "USD", "payment": true, "deleted_at": null,
       "repayments": [{"from": 200, "to": 1, "amount": "60.00"}]},
      {"id": 1004, "description": "Dinner", "date": "2021-10-25T20:30:00Z", "cost": "45.50",
       "currency_code": "USD", "payment": false, "deleted_at": null,
       "repayments": [{"from": 1, "to": 100, "amount": "22.75"}]}
    ]
  },
  "2021-11": {
    "expenses": [
      {"id": 1101, "description": "Concert tickets", "date": "2021-11-05T19:00:00Z", "cost": "150.00",
       "currency_code": "USD", "payment": false, "deleted_at": "2021-11-06T08:00:00Z",
       "repayments": [{"from": 1, "to": 100, "amount": "75.00"}]},
      {"id": 1102, "description": "Taxi", "date": "2021-11-09T23:10:00Z", "cost": "31.00",
       "currency_code": "USD", "payment": false, "deleted_at": null,
       "repayments": [{"from": 1, "to": 300, "amount": "15.50"}]},
      {"id": 1103, "description": "Gift", "date": "2021-11-15T12:00:00Z", "cost": "20.00",
       "currency_code": "USD", "payment": false, "deleted_at": null,
       "repayments": []}
    ]
  },
  "2021-12": {
    "expenses": [
      {"id": 1201, "description": "Rent", "date": "2021-12-01T08:00:00Z", "cost": "1800.00",
       "currency_code": "USD", "payment": false, "deleted_at": null,
       "repayments": [{"from": 1, "to": 200, "amount": "900.00"}]},
      {"id": 1202, "description": "Internet", "date": "2021-12-04T08:00:00Z", "cost": "59.99",
       "currency_code": "USD", "payment": false, "deleted_at": null,
       "repayments": [{"from": 1, "to": 200, "amount": "30.00"}]}
    ]
  }
}"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> Month {
        Month::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_default_data() {
        let mut source = TestSource::default();
        let october = source.expenses(&month("2021-10").bounds()).await.unwrap();
        assert_eq!(october.len(), 4);
        let empty = source.expenses(&month("2030-01").bounds()).await.unwrap();
        assert!(empty.is_empty());
        assert_eq!(source.calls().len(), 2);
        assert_eq!(source.calls()[0].dated_before, "2021-10-31");
    }

    #[tokio::test]
    async fn test_bad_bounds() {
        let mut source = TestSource::new(BTreeMap::new());
        let bounds = DateBounds {
            dated_after: "nope".into(),
            dated_before: "nope".into(),
        };
        assert!(source.expenses(&bounds).await.is_err());
    }
}
