//! SLDO overlay plotter: one chart per parameter, one line per CB position.

use std::path::{Path, PathBuf};

use crate::color::{generate_palette, REFERENCE_COLOR};
use crate::config::OverlayConfig;
use crate::data::loader::load_csv;
use crate::data::model::MeasurementTable;
use crate::error::{PlotError, Result};
use crate::figure::{Figure, LineStyle, Series};
use crate::render::export::ImageExporter;
use crate::render::render_svg;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// One expected input file and the CB position it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub folder: String,
    pub file: String,
    /// 1-based, in folder-list order.
    pub position: usize,
}

impl SourceDescriptor {
    pub fn path(&self, root: &Path) -> PathBuf {
        root.join(&self.folder).join(&self.file)
    }
}

/// A loaded, sorted table tagged with its CB position.
#[derive(Debug, Clone)]
pub struct PositionedTable {
    pub position: usize,
    pub table: MeasurementTable,
}

/// The configured sources, tagged 1..=N in list order.
pub fn sources(config: &OverlayConfig) -> Vec<SourceDescriptor> {
    config
        .folders
        .iter()
        .zip(&config.files)
        .enumerate()
        .map(|(i, (folder, file))| SourceDescriptor {
            folder: folder.clone(),
            file: file.clone(),
            position: i + 1,
        })
        .collect()
}

/// Fail on the first source file that does not exist.
pub fn validate_sources(root: &Path, sources: &[SourceDescriptor]) -> Result<()> {
    for source in sources {
        let path = source.path(root);
        if !path.is_file() {
            return Err(PlotError::MissingInputFile(path));
        }
    }
    Ok(())
}

/// Load every source, sort it by the X column and tag its position.
pub fn load_sources(
    root: &Path,
    sources: &[SourceDescriptor],
    x_column: &str,
) -> Result<Vec<PositionedTable>> {
    sources
        .iter()
        .map(|source| {
            let path = source.path(root);
            let mut table = load_csv(&path).map_err(|cause| PlotError::Load {
                path: path.clone(),
                cause,
            })?;
            if !table.has_column(x_column) {
                return Err(PlotError::MissingColumn {
                    column: x_column.to_string(),
                    source_path: path,
                });
            }
            table
                .sort_by_column(x_column)
                .map_err(|cause| PlotError::Load { path, cause })?;
            Ok(PositionedTable {
                position: source.position,
                table,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Figures
// ---------------------------------------------------------------------------

/// Build the overlay chart for one parameter.
///
/// Tables without the parameter column are skipped with a warning. The
/// reference curve comes from the first table and is drawn on every chart
/// that has it.
pub fn overlay_figure(param: &str, tables: &[PositionedTable], config: &OverlayConfig) -> Figure {
    let mut figure = Figure::new(
        format!("{param} vs Current (overlay of {} positions + VIN expected)", tables.len()),
        config.x_column.as_str(),
        param,
    );
    figure.size_in = config.figure_size_in;
    figure.x_range = Some(config.x_range.0..config.x_range.1);
    figure.legend = true;

    let palette = generate_palette(tables.len());
    for (entry, color) in tables.iter().zip(palette) {
        match entry.table.points(&config.x_column, param) {
            Some(points) => figure.series.push(Series {
                label: Some(format!("CB position {}", entry.position)),
                points,
                color,
                line_width: 2.0,
                line_style: LineStyle::Solid,
                marker_size: Some(4.0),
            }),
            None => log::warn!(
                "Column '{param}' not found for CB position {}",
                entry.position
            ),
        }
    }

    if let Some(reference) = tables
        .first()
        .and_then(|first| first.table.points(&config.x_column, &config.reference_column))
    {
        figure.series.push(Series {
            label: Some(config.reference_column.clone()),
            points: reference,
            color: REFERENCE_COLOR,
            line_width: 3.0,
            line_style: LineStyle::Dashed,
            marker_size: None,
        });
    }

    figure
}

/// File-name-safe form of a parameter name: spaces and slashes become `_`,
/// parentheses are dropped.
pub fn safe_name(param: &str) -> String {
    param
        .chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .map(|c| if c == ' ' || c == '/' { '_' } else { c })
        .collect()
}

/// Output file name for one parameter's chart.
pub fn output_file_name(param: &str) -> String {
    format!("overlay_{}_vs_Current_v1.png", safe_name(param))
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the whole overlay pipeline with paths relative to `root`.
///
/// Nothing is written unless every source file exists. Returns the images
/// written, in parameter order.
pub fn run(root: &Path, config: &OverlayConfig) -> Result<Vec<PathBuf>> {
    let sources = sources(config);
    validate_sources(root, &sources)?;

    let tables = load_sources(root, &sources, &config.x_column)?;
    log::info!("Loaded all {} modules successfully.", tables.len());

    let output_dir = root.join(&config.output_dir);
    std::fs::create_dir_all(&output_dir).map_err(|e| PlotError::Save {
        path: output_dir.clone(),
        cause: e.into(),
    })?;

    let exporter = ImageExporter::new().map_err(|cause| PlotError::Render {
        title: "chart fonts".into(),
        cause,
    })?;
    let mut written = Vec::with_capacity(config.parameters.len());

    for param in &config.parameters {
        let figure = overlay_figure(param, &tables, config);
        let svg = render_svg(&figure).map_err(|cause| PlotError::Render {
            title: figure.title.clone(),
            cause,
        })?;

        let out_path = output_dir.join(output_file_name(param));
        exporter
            .write_png(&svg, &out_path, config.dpi)
            .map_err(|cause| PlotError::Save {
                path: out_path.clone(),
                cause,
            })?;

        log::info!("Saved: {}", out_path.display());
        written.push(out_path);
    }

    log::info!("All plots saved in: {}", output_dir.display());
    Ok(written)
}
