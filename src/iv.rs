//! Reverse-bias IV curve plotter for a single module hybrid.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::Parser;
use plotters::style::RGBColor;

use crate::config::IvConfig;
use crate::data::loader::load_csv;
use crate::data::model::MeasurementTable;
use crate::error::{PlotError, Result};
use crate::figure::{Figure, LineStyle, Series};
use crate::render::export::ImageExporter;
use crate::render::render_svg;

/// Derived column: bias with its sign flipped so reverse bias is positive.
pub const REVERSE_BIAS_COLUMN: &str = "Reverse Bias (V)";
/// Derived column: leakage current, sign flipped, in microamps.
pub const LEAKAGE_COLUMN: &str = "Leakage Current (µA)";

pub const USAGE: &str = "Usage: plot-iv-curve <module> <date> <hybridID>\n\
                         Example: plot-iv-curve P-1009 17022026 0";

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "plot-iv-curve")]
#[command(about = "Plot the reverse-bias IV curve of one module hybrid")]
#[command(override_usage = "plot-iv-curve <module> <date> <hybridID>")]
struct IvArgs {
    /// Module name, run date and hybrid ID, e.g. P-1009 17022026 0.
    /// Taken verbatim, leading dashes included.
    #[arg(
        value_name = "ID",
        num_args = 0..,
        allow_hyphen_values = true,
        trailing_var_arg = true
    )]
    ids: Vec<String>,
}

/// The three identifiers naming one IV measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IvRequest {
    pub module: String,
    pub date: String,
    pub hybrid_id: String,
}

impl IvRequest {
    pub fn new(module: &str, date: &str, hybrid_id: &str) -> Self {
        Self {
            module: module.trim().to_string(),
            date: date.trim().to_string(),
            hybrid_id: hybrid_id.trim().to_string(),
        }
    }

    /// `run_<module>-<date>`
    pub fn run_name(&self) -> String {
        format!("run_{}-{}", self.module, self.date)
    }

    /// `Module<hybridID>`
    pub fn module_name(&self) -> String {
        format!("Module{}", self.hybrid_id)
    }

    /// Location of the IV CSV under `data_dir`.
    pub fn input_path(&self, data_dir: &Path) -> PathBuf {
        data_dir
            .join(self.run_name())
            .join("Results_dirigent")
            .join("iv_curve")
            .join(format!("{}_iv_curve.csv", self.module_name()))
    }

    /// Output file name without extension.
    pub fn output_stem(&self) -> String {
        format!("{}_{}_iv_curve_{}", self.module, self.module_name(), self.date)
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IvCommand {
    Plot(IvRequest),
    /// `--help`: the rendered help text, for the caller to print.
    Help(String),
}

/// Parse `<program> <module> <date> <hybridID>`.
///
/// Any count other than three is [`PlotError::InvalidArguments`]. Only a
/// leading `-h`/`--help` is read as a flag; every other word is an ID.
pub fn parse_args<I, T>(args: I) -> Result<IvCommand>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match IvArgs::try_parse_from(args) {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            return Ok(IvCommand::Help(e.render().to_string()));
        }
        Err(e) => {
            return Err(PlotError::InvalidArguments(format!("error: {}\n{USAGE}", e.kind())));
        }
    };

    match args.ids.as_slice() {
        [module, date, hybrid_id] => Ok(IvCommand::Plot(IvRequest::new(module, date, hybrid_id))),
        ids => Err(PlotError::InvalidArguments(format!(
            "error: expected 3 arguments, got {}\n{USAGE}",
            ids.len()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Columns and transform
// ---------------------------------------------------------------------------

/// Find the voltage and current columns by case-insensitive substring.
///
/// When several headers match, the last one wins.
pub fn resolve_columns(table: &MeasurementTable) -> Result<(String, String)> {
    let names = table.column_names();
    let mut voltage = None;
    let mut current = None;
    for name in &names {
        let lower = name.trim().to_lowercase();
        if lower.contains("voltage") {
            voltage = Some(name.clone());
        }
        if lower.contains("current") {
            current = Some(name.clone());
        }
    }
    match (voltage, current) {
        (Some(v), Some(i)) => Ok((v, i)),
        _ => Err(PlotError::UnresolvedColumns { available: names }),
    }
}

/// Add the reverse-bias and leakage-current columns.
pub fn add_derived_columns(
    table: &mut MeasurementTable,
    voltage_column: &str,
    current_column: &str,
) -> anyhow::Result<()> {
    let reverse_bias: Vec<f64> = table
        .column(voltage_column)
        .ok_or_else(|| anyhow::anyhow!("no column '{voltage_column}'"))?
        .iter()
        .map(|v| -v)
        .collect();
    let leakage: Vec<f64> = table
        .column(current_column)
        .ok_or_else(|| anyhow::anyhow!("no column '{current_column}'"))?
        .iter()
        .map(|i| -i * 1e6)
        .collect();

    table.insert_column(REVERSE_BIAS_COLUMN, reverse_bias)?;
    table.insert_column(LEAKAGE_COLUMN, leakage)?;
    Ok(())
}

/// Build the IV chart from a transformed, sorted table.
pub fn iv_figure(request: &IvRequest, table: &MeasurementTable, config: &IvConfig) -> Figure {
    let mut figure = Figure::new(
        format!("IV Curve: {}", request.module),
        REVERSE_BIAS_COLUMN,
        LEAKAGE_COLUMN,
    );
    figure.size_in = config.figure_size_in;
    figure.grid_alpha = Some(0.3);
    figure.series.push(Series {
        label: None,
        points: table
            .points(REVERSE_BIAS_COLUMN, LEAKAGE_COLUMN)
            .unwrap_or_default(),
        color: RGBColor(0, 0, 0),
        line_width: 1.5,
        line_style: LineStyle::Solid,
        marker_size: Some(4.0),
    });
    figure
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct IvOutput {
    pub png: PathBuf,
    pub pdf: PathBuf,
    pub figure: Figure,
}

/// Load, transform, render and save one IV curve.
pub fn run(request: &IvRequest, config: &IvConfig) -> Result<IvOutput> {
    let csv_path = request.input_path(&config.data_dir);
    if !csv_path.is_file() {
        return Err(PlotError::MissingInputFile(csv_path));
    }

    let mut table = load_csv(&csv_path).map_err(|cause| PlotError::Load {
        path: csv_path.clone(),
        cause,
    })?;
    log::debug!("{}: {} rows", csv_path.display(), table.len());

    let (voltage_column, current_column) = resolve_columns(&table)?;
    log::debug!("voltage column '{voltage_column}', current column '{current_column}'");

    add_derived_columns(&mut table, &voltage_column, &current_column)
        .and_then(|()| table.sort_by_column(REVERSE_BIAS_COLUMN))
        .map_err(|cause| PlotError::Load {
            path: csv_path.clone(),
            cause,
        })?;

    let figure = iv_figure(request, &table, config);
    let svg = render_svg(&figure).map_err(|cause| PlotError::Render {
        title: figure.title.clone(),
        cause,
    })?;

    std::fs::create_dir_all(&config.plot_dir).map_err(|e| PlotError::Save {
        path: config.plot_dir.clone(),
        cause: e.into(),
    })?;

    let stem = request.output_stem();
    let png = config.plot_dir.join(format!("{stem}.png"));
    let pdf = config.plot_dir.join(format!("{stem}.pdf"));

    let exporter = ImageExporter::new().map_err(|cause| PlotError::Render {
        title: figure.title.clone(),
        cause,
    })?;
    exporter
        .write_png(&svg, &png, config.dpi)
        .map_err(|cause| PlotError::Save {
            path: png.clone(),
            cause,
        })?;
    exporter.write_pdf(&svg, &pdf).map_err(|cause| PlotError::Save {
        path: pdf.clone(),
        cause,
    })?;

    log::info!("Saved plot: {}", png.display());
    log::info!("Saved plot: {}", pdf.display());

    Ok(IvOutput { png, pdf, figure })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn table(columns: &[(&str, Vec<f64>)]) -> MeasurementTable {
        MeasurementTable::new(
            "Module0_iv_curve.csv",
            columns
                .iter()
                .map(|(name, values)| Column {
                    name: name.to_string(),
                    values: values.clone(),
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn paths_follow_run_layout() {
        let request = IvRequest::new("P-1009", "17022026", "0");
        assert_eq!(
            request.input_path(Path::new("/data")),
            Path::new("/data/run_P-1009-17022026/Results_dirigent/iv_curve/Module0_iv_curve.csv")
        );
        assert_eq!(request.output_stem(), "P-1009_Module0_iv_curve_17022026");
    }

    #[test]
    fn arguments_are_trimmed() {
        let command = parse_args(["plot-iv-curve", " P-1009 ", "17022026", " 0"]).unwrap();
        assert_eq!(command, IvCommand::Plot(IvRequest::new("P-1009", "17022026", "0")));
    }

    #[test]
    fn dashed_ids_are_plain_values() {
        let command = parse_args(["plot-iv-curve", "--x", "-17022026", "--help"]).unwrap();
        assert_eq!(command, IvCommand::Plot(IvRequest::new("--x", "-17022026", "--help")));
    }

    #[test]
    fn help_is_returned_not_exited() {
        for flag in ["--help", "-h"] {
            match parse_args(["plot-iv-curve", flag]).unwrap() {
                IvCommand::Help(text) => assert!(text.contains("plot-iv-curve <module> <date> <hybridID>")),
                other => panic!("expected help, got {other:?}"),
            }
        }
    }

    #[test]
    fn wrong_argument_count_is_invalid() {
        for args in [
            vec!["plot-iv-curve", "P-1009", "17022026"],
            vec!["plot-iv-curve"],
            vec!["plot-iv-curve", "P-1009", "17022026", "0", "extra"],
        ] {
            let err = parse_args(args).unwrap_err();
            assert!(matches!(err, PlotError::InvalidArguments(_)));
            assert_eq!(err.exit_code(), 2);
            assert!(err.to_string().contains("Usage: plot-iv-curve"));
        }
    }

    #[test]
    fn columns_match_by_case_insensitive_substring() {
        let t = table(&[
            ("Time (s)", vec![0.0]),
            (" VOLTAGE [V] ", vec![1.0]),
            ("Meas. current", vec![1.0]),
        ]);
        let (v, i) = resolve_columns(&t).unwrap();
        assert_eq!(v, " VOLTAGE [V] ");
        assert_eq!(i, "Meas. current");
    }

    #[test]
    fn unresolved_columns_list_available_names() {
        let t = table(&[("Bias", vec![1.0]), ("Current (A)", vec![1.0])]);
        match resolve_columns(&t).unwrap_err() {
            PlotError::UnresolvedColumns { available } => {
                assert_eq!(available, vec!["Bias", "Current (A)"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn transform_flips_sign_and_scales_then_sorts() {
        let mut t = table(&[
            ("Voltage (V)", vec![1.0, 2.0, 3.0]),
            ("Current (A)", vec![1e-6, 2e-6, 3e-6]),
        ]);
        add_derived_columns(&mut t, "Voltage (V)", "Current (A)").unwrap();

        assert_eq!(t.column(REVERSE_BIAS_COLUMN).unwrap(), &[-1.0, -2.0, -3.0]);
        let leakage = t.column(LEAKAGE_COLUMN).unwrap();
        for (got, want) in leakage.iter().zip([-1.0, -2.0, -3.0]) {
            assert!((got - want).abs() < 1e-9);
        }

        t.sort_by_column(REVERSE_BIAS_COLUMN).unwrap();
        assert_eq!(t.column(REVERSE_BIAS_COLUMN).unwrap(), &[-3.0, -2.0, -1.0]);
        let leakage = t.column(LEAKAGE_COLUMN).unwrap();
        for (got, want) in leakage.iter().zip([-3.0, -2.0, -1.0]) {
            assert!((got - want).abs() < 1e-9);
        }
        assert_eq!(t.column("Voltage (V)").unwrap(), &[3.0, 2.0, 1.0]);
    }

    #[test]
    fn figure_is_single_black_marked_line() {
        let mut t = table(&[
            ("Voltage (V)", vec![0.0, -10.0]),
            ("Current (A)", vec![0.0, -2e-6]),
        ]);
        add_derived_columns(&mut t, "Voltage (V)", "Current (A)").unwrap();
        let request = IvRequest::new("P-1009", "17022026", "0");
        let figure = iv_figure(&request, &t, &IvConfig::default());
        assert_eq!(figure.title, "IV Curve: P-1009");
        assert_eq!(figure.series.len(), 1);
        assert_eq!(figure.grid_alpha, Some(0.3));
        assert!(!figure.legend);
        let series = &figure.series[0];
        assert_eq!((series.color.0, series.color.1, series.color.2), (0, 0, 0));
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[1].0, 10.0);
        assert!((series.points[1].1 - 2.0).abs() < 1e-9);
    }
}
