use crate::model::Amount;
use serde::{Serialize, Serializer};

/// The amount credited to each counterparty label during one month.
///
/// Labels are kept in the order they were first credited so that the exported columns come out in
/// a stable order. A label with no qualifying expenses is simply absent.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct MonthlyTotals {
    entries: Vec<(String, Amount)>,
}

impl MonthlyTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the running total for `label`.
    pub fn credit(&mut self, label: impl Into<String>, amount: Amount) {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some((_, total)) => *total += amount,
            None => self.entries.push((label, amount)),
        }
    }

    pub fn get(&self, label: &str) -> Option<Amount> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, amount)| *amount)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Amount)> {
        self.entries.iter().map(|(l, a)| (l.as_str(), *a))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for MonthlyTotals {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}
