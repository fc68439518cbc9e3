//! Expense records as reported by the expense service, and the rule that decides which of them
//! count toward a counterparty's monthly total.

use crate::model::Amount;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The numeric identifier of a user of the expense service.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// One entry of an expense's repayment list: `from` owes `to` the `amount`.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Repayment {
    pub from: UserId,
    pub to: UserId,
    #[serde(default)]
    pub amount: Amount,
}

/// A shared cost or a settlement, as returned by the service. Only the fields that matter for
/// aggregation (and a few that help when reading logs) are kept.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<String>,
    pub cost: Amount,
    #[serde(default)]
    pub currency_code: Option<String>,
    /// True when this is a direct payment between users rather than a shared cost.
    #[serde(default)]
    pub payment: bool,
    #[serde(default)]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub repayments: Vec<Repayment>,
}

impl Expense {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_settlement(&self) -> bool {
        self.payment
    }

    /// Whether this expense counts toward the monthly totals: it must not be deleted, must not be
    /// a settlement, and must have at least one repayment.
    pub fn qualifies(&self) -> bool {
        !self.is_deleted() && !self.is_settlement() && !self.repayments.is_empty()
    }

    /// Attributes a qualifying expense to the user who is owed money.
    ///
    /// Only the first repayment is considered and the counterparty is credited half of the total
    /// cost. This is an even two-person split; expenses with more participants are not split
    /// correctly.
    pub fn attribute(&self) -> Option<Attribution> {
        if !self.qualifies() {
            return None;
        }
        let first = self.repayments.first()?;
        Some(Attribution {
            to_user: first.to,
            from_user: first.from,
            cost: self.cost,
        })
    }
}

/// The part of a qualifying expense that aggregation cares about.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub to_user: UserId,
    pub from_user: UserId,
    pub cost: Amount,
}

impl Attribution {
    /// The amount credited to `to_user`, half of the cost.
    pub fn share(&self) -> Amount {
        self.cost.half()
    }
}

/// The body of the service's `get_expenses` response.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub(crate) struct ExpensesResponse {
    #[serde(default)]
    pub(crate) expenses: Vec<Expense>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{expense, repayment};

    #[test]
    fn test_qualifying_expense_is_attributed_to_first_repayment() {
        let e = expense("100.00", vec![repayment(1, 2), repayment(3, 4)]);
        let a = e.attribute().unwrap();
        assert_eq!(a.to_user, UserId::new(2));
        assert_eq!(a.from_user, UserId::new(1));
        assert_eq!(a.share(), Amount::from_str("50").unwrap());
    }

    #[test]
    fn test_deleted_expense_is_skipped() {
        let mut e = expense("100.00", vec![repayment(1, 2)]);
        e.deleted_at = Some("2021-10-05T10:00:00Z".into());
        assert!(!e.qualifies());
        assert!(e.attribute().is_none());
    }

    #[test]
    fn test_settlement_is_skipped() {
        let mut e = expense("100.00", vec![repayment(1, 2)]);
        e.payment = true;
        assert!(e.attribute().is_none());
    }

    #[test]
    fn test_no_repayments_is_skipped() {
        let e = expense("100.00", vec![]);
        assert!(e.attribute().is_none());
    }

    #[test]
    fn test_deserialize_service_json() {
        let json = r#"{
            "id": 1234,
            "description": "Groceries",
            "date": "2021-10-04T12:00:00Z",
            "cost": "84.20",
            "currency_code": "USD",
            "payment": false,
            "deleted_at": null,
            "repayments": [{"from": 11, "to": 22, "amount": "42.1"}],
            "users": [{"user_id": 11}, {"user_id": 22}]
        }"#;
        let e: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(e.id, 1234);
        assert!(!e.is_deleted());
        assert_eq!(e.repayments.len(), 1);
        assert_eq!(e.repayments[0].to, UserId::new(22));
        assert_eq!(e.attribute().unwrap().share().to_string(), "42.1");
    }

    #[test]
    fn test_deserialize_minimal_json() {
        let e: Expense = serde_json::from_str(r#"{"cost": "5"}"#).unwrap();
        assert!(e.repayments.is_empty());
        assert!(!e.qualifies());
    }

    #[test]
    fn test_user_id_parse_trims() {
        assert_eq!(UserId::from_str(" 42").unwrap(), UserId::new(42));
        assert!(UserId::from_str("bob").is_err());
    }
}
