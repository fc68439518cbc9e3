//! The export command: fetch, aggregate and write the monthly table.

use crate::api::{self, ExpenseSource, Mode};
use crate::args::ExportArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::report::{CsvOptions, Report};
use crate::{pipeline, Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

/// What the export produced.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub months: usize,
    pub columns: Vec<String>,
    pub report: Report,
}

/// Fetches the expenses for every month in `args.range()`, aggregates them per counterparty and
/// writes the table to `args.output()`.
///
/// Nothing is written unless every month was fetched successfully.
///
/// # Errors
/// - `ErrorType::Upstream` if the expense source fails for any month.
/// - `ErrorType::Export` if the table cannot be written.
pub async fn export(config: &Config, mode: Mode, args: &ExportArgs) -> Result<Out<ExportSummary>> {
    let mut source = api::source(config, mode).pub_result(ErrorType::Config)?;
    export_with(source.as_mut(), config, args).await
}

/// Does the work of `export` with an already constructed `source`.
pub(crate) async fn export_with(
    source: &mut (dyn ExpenseSource + Send),
    config: &Config,
    args: &ExportArgs,
) -> Result<Out<ExportSummary>> {
    let range = args.range();
    if range.is_empty() {
        warn!(
            "--from_date {} is not before --to_date {}, no months will be exported",
            range.start(),
            range.end()
        );
    }

    let report = pipeline::run(source, &range, config.lookup())
        .await
        .pub_result(ErrorType::Upstream)?;

    let options = CsvOptions {
        index: !args.no_index(),
    };
    report
        .write_csv(args.output(), options)
        .await
        .with_context(|| format!("Unable to write {}", args.output().display()))
        .pub_result(ErrorType::Export)?;

    let months = report.records().len();
    let summary = ExportSummary {
        output: args.output().to_path_buf(),
        months,
        columns: report.columns().into_iter().map(String::from).collect(),
        report,
    };
    let message = format!(
        "Wrote {} month{} to {}",
        months,
        if months == 1 { "" } else { "s" },
        args.output().display()
    );
    Ok(Out::new(message, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestSource;
    use crate::error::Res;
    use crate::model::{DateBounds, Expense, Month};
    use std::str::FromStr;
    use tempfile::TempDir;

    fn config() -> Config {
        Config::from_vars(|key| match key {
            "CONSUMER_KEY" | "CONSUMER_SECRET" | "API_KEY" => Some("x".into()),
            "LOOKUP" => Some("100,Alice,200,Bob".into()),
            _ => None,
        })
        .unwrap()
    }

    fn args(dir: &TempDir, from: &str, to: &str) -> ExportArgs {
        ExportArgs::new(
            Month::from_str(from).unwrap(),
            Month::from_str(to).unwrap(),
            dir.path().join("expenses.csv"),
            false,
        )
    }

    #[tokio::test]
    async fn test_export_seed_data() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, "2021-10", "2022-01");
        let mut source = TestSource::default();

        let out = export_with(&mut source, &config(), &args).await.unwrap();

        assert_eq!(out.message(), format!("Wrote 3 months to {}", args.output().display()));
        let written = std::fs::read_to_string(args.output()).unwrap();
        let expected = "\
,Alice,Bob,month,300
0,64.85,60,2021-10,
1,,,2021-11,15.5
2,,929.995,2021-12,
";
        assert_eq!(written, expected);
    }

    #[tokio::test]
    async fn test_export_twice_is_identical() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, "2021-09", "2022-02");

        export_with(&mut TestSource::default(), &config(), &args)
            .await
            .unwrap();
        let first = std::fs::read(args.output()).unwrap();
        export_with(&mut TestSource::default(), &config(), &args)
            .await
            .unwrap();
        let second = std::fs::read(args.output()).unwrap();

        assert_eq!(first, second);
    }

    struct BrokenSource;

    #[async_trait::async_trait]
    impl ExpenseSource for BrokenSource {
        async fn expenses(&mut self, _: &DateBounds) -> Res<Vec<Expense>> {
            anyhow::bail!("rate limited")
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, "2021-10", "2021-12");

        let err = export_with(&mut BrokenSource, &config(), &args)
            .await
            .unwrap_err();

        assert_eq!(err.error_type(), ErrorType::Upstream);
        assert!(!args.output().exists());
    }

    #[tokio::test]
    async fn test_unwritable_output_is_export_error() {
        let dir = TempDir::new().unwrap();
        let args = ExportArgs::new(
            Month::from_str("2021-10").unwrap(),
            Month::from_str("2021-11").unwrap(),
            dir.path().join("missing-dir").join("expenses.csv"),
            false,
        );
        let err = export_with(&mut TestSource::default(), &config(), &args)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Export);
    }
}
