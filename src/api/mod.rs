//! The seam between the aggregation pipeline and the expense service.
//!
//! `ExpenseSource` is implemented by `SplitwiseClient`, which talks to the real service, and by
//! `TestSource`, which serves canned data from memory.

mod splitwise;
mod test_source;

use crate::error::Res;
use crate::model::{DateBounds, Expense};
use crate::Config;
use tracing::debug;

pub use splitwise::SplitwiseClient;
pub use test_source::TestSource;

/// The environment variable that switches the program to `Mode::Testing`.
pub const TEST_MODE_ENV: &str = "SPLITWISE_EXPORT_IN_TEST_MODE";

/// Something that can return the expense records dated within `bounds`.
#[async_trait::async_trait]
pub trait ExpenseSource {
    async fn expenses(&mut self, bounds: &DateBounds) -> Res<Vec<Expense>>;
}

/// Whether to talk to the real expense service or to serve canned data from memory.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Splitwise,
    Testing,
}

impl Mode {
    /// Returns `Mode::Testing` when `SPLITWISE_EXPORT_IN_TEST_MODE` is set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(v) if !v.is_empty() => Mode::Testing,
            _ => Mode::Splitwise,
        }
    }
}

/// Creates the `ExpenseSource` for `mode`.
pub fn source(config: &Config, mode: Mode) -> Res<Box<dyn ExpenseSource + Send>> {
    debug!("Creating an expense source in {mode:?} mode");
    Ok(match mode {
        Mode::Splitwise => Box::new(SplitwiseClient::new(config)?),
        Mode::Testing => Box::new(TestSource::default()),
    })
}
