//! Compiled-in settings for both plotting tools.
//!
//! Every field has a built-in default. A JSON file named by
//! [`OVERLAY_CONFIG_ENV`] or [`IV_CONFIG_ENV`] may override any subset of
//! fields; missing fields keep their defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};

/// Environment variable naming an overlay-plotter JSON config file.
pub const OVERLAY_CONFIG_ENV: &str = "SLDO_OVERLAY_CONFIG";
/// Environment variable naming an IV-plotter JSON config file.
pub const IV_CONFIG_ENV: &str = "IV_CURVE_CONFIG";
/// Set to `1` or `true` to skip the interactive chart window.
pub const NO_DISPLAY_ENV: &str = "IV_CURVE_NO_DISPLAY";

// ---------------------------------------------------------------------------
// Overlay plotter
// ---------------------------------------------------------------------------

/// Settings for the SLDO overlay plotter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Folder for each CB position, in position order.
    pub folders: Vec<String>,
    /// File inside the matching folder, in position order.
    pub files: Vec<String>,
    /// Parameters drawn, one image each.
    pub parameters: Vec<String>,
    /// Reference curve taken from the first position's table.
    pub reference_column: String,
    /// Shared X column; every table is sorted by it.
    pub x_column: String,
    pub output_dir: PathBuf,
    pub x_range: (f64, f64),
    pub figure_size_in: (f64, f64),
    pub dpi: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            folders: (1..=8).map(|i| format!("sldo_vi_curves_TEC{i}")).collect(),
            files: (1..=8).map(|i| format!("Module{i}_full.csv")).collect(),
            parameters: [
                "Voltage (V)",
                "VIN",
                "VOFS",
                "VDDD_ROC0",
                "VDDA_ROC0",
                "VDDD_ROC1",
                "VDDA_ROC1",
                "VDDD_ROC2",
                "VDDA_ROC2",
                "VDDD_ROC3",
                "VDDA_ROC3",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            reference_column: "VIN expected (2x2 HDI V3)".to_string(),
            x_column: "Current (A)".to_string(),
            output_dir: PathBuf::from("overlay_plots"),
            x_range: (0.0, 10.0),
            figure_size_in: (10.0, 6.0),
            dpi: 200.0,
        }
    }
}

impl OverlayConfig {
    /// Defaults, overridden by the file named in [`OVERLAY_CONFIG_ENV`].
    pub fn from_env() -> Result<Self> {
        let config: Self = load_override(OVERLAY_CONFIG_ENV)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.folders.len() != self.files.len() {
            return Err(PlotError::Config(anyhow::anyhow!(
                "{} folders but {} files",
                self.folders.len(),
                self.files.len()
            )));
        }
        if self.folders.is_empty() {
            return Err(PlotError::Config(anyhow::anyhow!("no source folders configured")));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// IV curve plotter
// ---------------------------------------------------------------------------

/// Settings for the IV curve plotter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IvConfig {
    /// Root holding the `run_<module>-<date>` directories.
    pub data_dir: PathBuf,
    /// Where both output images are written.
    pub plot_dir: PathBuf,
    pub figure_size_in: (f64, f64),
    pub dpi: f64,
    /// Show the chart in a window after saving.
    pub display: bool,
}

impl Default for IvConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("qc_data"),
            plot_dir: PathBuf::from("plots_iv_curve"),
            figure_size_in: (7.5, 5.0),
            dpi: 200.0,
            display: true,
        }
    }
}

impl IvConfig {
    /// Defaults, overridden by the file named in [`IV_CONFIG_ENV`] and by
    /// [`NO_DISPLAY_ENV`].
    pub fn from_env() -> Result<Self> {
        let mut config: Self = load_override(IV_CONFIG_ENV)?;
        if std::env::var(NO_DISPLAY_ENV).is_ok_and(|v| is_truthy(&v)) {
            config.display = false;
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_override<T>(var: &str) -> Result<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match std::env::var_os(var) {
        Some(path) => {
            log::info!("reading configuration from {}", Path::new(&path).display());
            load_file(Path::new(&path)).map_err(PlotError::Config)
        }
        None => Ok(T::default()),
    }
}

/// Parse a JSON config file; fields it leaves out keep their defaults.
pub fn load_file<T>(path: &Path) -> anyhow::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn overlay_defaults_cover_eight_positions_and_eleven_parameters() {
        let config = OverlayConfig::default();
        assert_eq!(config.folders.len(), 8);
        assert_eq!(config.files.len(), 8);
        assert_eq!(config.folders[0], "sldo_vi_curves_TEC1");
        assert_eq!(config.files[7], "Module8_full.csv");
        assert_eq!(config.parameters.len(), 11);
        assert_eq!(config.parameters[0], "Voltage (V)");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "data_dir": "/lab/qc_data", "display": false }}"#).unwrap();
        let config: IvConfig = load_file(file.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/lab/qc_data"));
        assert!(!config.display);
        assert_eq!(config.plot_dir, PathBuf::from("plots_iv_curve"));
        assert_eq!(config.dpi, 200.0);
    }

    #[test]
    fn mismatched_sources_are_rejected() {
        let config = OverlayConfig {
            files: vec!["Module1_full.csv".into()],
            ..OverlayConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(load_file::<OverlayConfig>(file.path()).is_err());
    }

    #[test]
    fn truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" TRUE "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }
}
