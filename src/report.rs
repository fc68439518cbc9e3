//! The per-month results of a run and their export as a CSV table.

use crate::error::Res;
use crate::model::{Month, MonthlyTotals, MONTH_COLUMN};
use crate::utils;
use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// The totals for one month, tagged with the month they belong to.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MonthRecord {
    month: Month,
    totals: MonthlyTotals,
}

impl MonthRecord {
    pub fn new(month: Month, totals: MonthlyTotals) -> Self {
        Self { month, totals }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn totals(&self) -> &MonthlyTotals {
        &self.totals
    }
}

/// Controls the shape of the exported table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CsvOptions {
    /// Emit a leading unnamed column holding the row number, starting at 0.
    pub index: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { index: true }
    }
}

/// The ordered, per-month results of a run.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct Report {
    records: Vec<MonthRecord>,
}

impl Report {
    pub(crate) fn push(&mut self, record: MonthRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[MonthRecord] {
        &self.records
    }

    /// The union of every record's column names in the order they are first seen. Each record
    /// contributes its counterparty labels followed by the `month` column.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for record in &self.records {
            for name in record.totals.labels().chain(std::iter::once(MONTH_COLUMN)) {
                if !columns.contains(&name) {
                    columns.push(name);
                }
            }
        }
        columns
    }

    /// Renders the report as CSV: one row per month, one column per counterparty, plus the `month`
    /// column. Counterparties with nothing in a given month are left blank.
    pub fn to_csv(&self, options: CsvOptions) -> Res<Vec<u8>> {
        let columns = self.columns();
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header: Vec<&str> = Vec::with_capacity(columns.len() + 1);
        if options.index {
            header.push("");
        }
        header.extend(columns.iter().copied());
        if !header.is_empty() {
            writer
                .write_record(&header)
                .context("Unable to write the CSV header")?;
        }

        for (ix, record) in self.records.iter().enumerate() {
            let mut row: Vec<String> = Vec::with_capacity(header.len());
            if options.index {
                row.push(ix.to_string());
            }
            for column in &columns {
                let cell = if *column == MONTH_COLUMN {
                    record.month.to_string()
                } else {
                    record
                        .totals
                        .get(column)
                        .map(|amount| amount.to_string())
                        .unwrap_or_default()
                };
                row.push(cell);
            }
            writer
                .write_record(&row)
                .with_context(|| format!("Unable to write the CSV row for {}", record.month))?;
        }

        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Unable to finish writing the CSV data: {e}"))
    }

    /// Writes the report to `path`. The data is written to a temporary sibling file first and then
    /// moved into place, so `path` is either left untouched or holds the complete table.
    pub async fn write_csv(&self, path: &Path, options: CsvOptions) -> Res<()> {
        let data = self.to_csv(options)?;
        let tmp = tmp_path(path);
        if let Err(e) = utils::write(&tmp, &data).await {
            utils::remove_if_exists(&tmp).await?;
            return Err(e);
        }
        utils::rename(&tmp, path).await
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
