/// Data layer: measurement tables and CSV loading.
///
/// Architecture:
/// ```text
///  Module<N>_full.csv / Module<ID>_iv_curve.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → MeasurementTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ MeasurementTable │  named f64 columns, sort, derived columns
///   └──────────────────┘
/// ```

pub mod loader;
pub mod model;
