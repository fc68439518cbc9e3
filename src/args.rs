//! These structs provide the CLI interface for the splitwise-export CLI.

use crate::model::{Month, MonthRange};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// splitwise-export: Summarize shared Splitwise expenses per person per month.
///
/// For every month from --from_date up to, but not including, --to_date, this program downloads
/// your Splitwise expenses and adds up half of the cost of every shared expense under the name of
/// the person who paid it. The result is written as a CSV table with one row per month and one
/// column per person.
///
/// Credentials and the id-to-name lookup are read from the environment or from a .env file:
/// CONSUMER_KEY, CONSUMER_SECRET, API_KEY and LOOKUP (e.g. LOOKUP=123,Alice,456,Bob).
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[clap(flatten)]
    export: ExportArgs,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn export(&self) -> &ExportArgs {
        &self.export
    }
}

/// Arguments that are not specific to the export.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// A file of KEY=VALUE lines holding the configuration. Values in the environment take
    /// precedence over the file. It is fine for this file not to exist.
    #[arg(long, env = "SPLITWISE_ENV_FILE", default_value = ".env")]
    env_file: PathBuf,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn env_file(&self) -> &Path {
        &self.env_file
    }
}

/// Args that select the months to export and where to write them.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The first month to export, in the format YYYY-MM.
    #[arg(long = "from_date", alias = "from-date", value_name = "YYYY-MM")]
    from_date: Month,

    /// The month to stop at, in the format YYYY-MM. This month is not exported.
    #[arg(long = "to_date", alias = "to-date", value_name = "YYYY-MM")]
    to_date: Month,

    /// Where to write the CSV table.
    #[arg(long, default_value = "expenses.csv")]
    output: PathBuf,

    /// Do not write the leading row-number column.
    #[arg(long)]
    no_index: bool,
}

impl ExportArgs {
    pub fn new(from_date: Month, to_date: Month, output: impl Into<PathBuf>, no_index: bool) -> Self {
        Self {
            from_date,
            to_date,
            output: output.into(),
            no_index,
        }
    }

    pub fn from_date(&self) -> Month {
        self.from_date
    }

    pub fn to_date(&self) -> Month {
        self.to_date
    }

    pub fn range(&self) -> MonthRange {
        MonthRange::new(self.from_date, self.to_date)
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn no_index(&self) -> bool {
        self.no_index
    }
}
