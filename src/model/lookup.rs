//! Maps user identifiers to the display labels used as column names in the output.

use crate::model::UserId;
use anyhow::{bail, ensure, Context};
use std::collections::BTreeMap;
use std::str::FromStr;

/// The column name reserved for the month key. No label may use it.
pub const MONTH_COLUMN: &str = "month";

/// An immutable mapping from `UserId` to display label.
///
/// It is parsed from a flat list of comma-separated tokens that alternate between an integer id and
/// a label, e.g. `"123,Alice,456,Bob"`. If an id appears more than once, the last label wins.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct NameLookup {
    names: BTreeMap<UserId, String>,
}

impl NameLookup {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        if s.trim().is_empty() {
            bail!("The name lookup is empty, expected a list like '123,Alice,456,Bob'");
        }
        let tokens: Vec<&str> = s.split(',').collect();
        ensure!(
            tokens.len() % 2 == 0,
            "The name lookup has an odd number of entries ({}), expected id,label pairs",
            tokens.len()
        );
        let mut names = BTreeMap::new();
        for pair in tokens.chunks(2) {
            let (id, label) = (pair[0], pair[1]);
            let id = UserId::from_str(id)
                .with_context(|| format!("The name lookup id '{id}' is not an integer"))?;
            ensure!(
                label != MONTH_COLUMN,
                "The name lookup label for {id} is '{MONTH_COLUMN}', which is reserved"
            );
            names.insert(id, label.to_string());
        }
        Ok(Self { names })
    }

    pub fn get(&self, id: UserId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// The display label for `id`, falling back to the id itself when it is not in the lookup.
    pub fn label(&self, id: UserId) -> String {
        match self.get(id) {
            Some(name) => name.to_string(),
            None => id.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromStr for NameLookup {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<S: Into<String>> FromIterator<(i64, S)> for NameLookup {
    fn from_iter<T: IntoIterator<Item = (i64, S)>>(iter: T) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(id, name)| (UserId::new(id), name.into()))
                .collect(),
        }
    }
}
