use std::cmp::Ordering;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Column – one named series of samples
// ---------------------------------------------------------------------------

/// A single named column. Empty or non-numeric cells are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

// ---------------------------------------------------------------------------
// MeasurementTable – one loaded CSV file
// ---------------------------------------------------------------------------

/// A measurement table: one row per sample, columns in header order.
#[derive(Debug, Clone)]
pub struct MeasurementTable {
    source: PathBuf,
    columns: Vec<Column>,
    rows: usize,
}

impl MeasurementTable {
    /// Build a table from columns that all have the same length.
    pub fn new(source: impl Into<PathBuf>, columns: Vec<Column>) -> anyhow::Result<Self> {
        let rows = columns.first().map_or(0, |c| c.values.len());
        if let Some(bad) = columns.iter().find(|c| c.values.len() != rows) {
            anyhow::bail!(
                "column '{}' has {} values but table has {rows} rows",
                bad.name,
                bad.values.len()
            );
        }
        Ok(Self {
            source: source.into(),
            columns,
            rows,
        })
    }

    /// File the table was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in header order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Values of the column with exactly this name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Append a derived column, replacing any existing column of that name.
    pub fn insert_column(&mut self, name: &str, values: Vec<f64>) -> anyhow::Result<()> {
        if values.len() != self.rows {
            anyhow::bail!(
                "derived column '{name}' has {} values but table has {} rows",
                values.len(),
                self.rows
            );
        }
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
        Ok(())
    }

    /// Reorder every column so that `key` ascends. NaN keys sort last and
    /// equal keys keep their file order.
    pub fn sort_by_column(&mut self, key: &str) -> anyhow::Result<()> {
        let keys = self
            .column(key)
            .ok_or_else(|| anyhow::anyhow!("cannot sort by missing column '{key}'"))?;

        let mut order: Vec<usize> = (0..self.rows).collect();
        order.sort_by(|&a, &b| compare_nan_last(keys[a], keys[b]));

        for col in &mut self.columns {
            col.values = order.iter().map(|&i| col.values[i]).collect();
        }
        Ok(())
    }

    /// Finite `(x, y)` pairs for two columns, in row order.
    pub fn points(&self, x: &str, y: &str) -> Option<Vec<(f64, f64)>> {
        let xs = self.column(x)?;
        let ys = self.column(y)?;
        Some(
            xs.iter()
                .zip(ys)
                .filter(|(a, b)| a.is_finite() && b.is_finite())
                .map(|(&a, &b)| (a, b))
                .collect(),
        )
    }
}

fn compare_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}
