use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;

use super::model::{Column, MeasurementTable};

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Load a measurement CSV: one header row with column names, one sample per
/// following row.
///
/// Every column is read as `f64`. Empty cells, short rows and cells that do
/// not parse as a number become NaN, so a text column that is never plotted
/// does not stop the file from loading.
pub fn load_csv(path: &Path) -> Result<MeasurementTable> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut values: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
    let mut non_numeric = vec![0usize; headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, column) in values.iter_mut().enumerate() {
            let cell = record.get(col_idx).unwrap_or("");
            let value = parse_cell(cell);
            if value.is_none() && !cell.trim().is_empty() {
                non_numeric[col_idx] += 1;
            }
            column.push(value.unwrap_or(f64::NAN));
        }
    }

    for (name, count) in headers.iter().zip(&non_numeric) {
        if *count > 0 {
            log::debug!(
                "{}: column '{name}' has {count} non-numeric cells",
                path.display()
            );
        }
    }

    let columns = headers
        .into_iter()
        .zip(values)
        .map(|(name, values)| Column { name, values })
        .collect();

    MeasurementTable::new(path, columns)
}

fn parse_cell(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}
