use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy shared by both plotting pipelines
// ---------------------------------------------------------------------------

/// Every way a plotting run can fail.
///
/// Each variant maps onto a process exit status via [`PlotError::exit_code`].
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("CSV file not found: {}", .0.display())]
    MissingInputFile(PathBuf),

    #[error("column '{column}' not found in {}", .source_path.display())]
    MissingColumn {
        column: String,
        source_path: PathBuf,
    },

    #[error("Could not find voltage/current columns in {available:?}")]
    UnresolvedColumns { available: Vec<String> },

    #[error("{0}")]
    InvalidArguments(String),

    #[error("loading {}: {cause:#}", .path.display())]
    Load {
        path: PathBuf,
        cause: anyhow::Error,
    },

    #[error("rendering '{title}': {cause:#}")]
    Render {
        title: String,
        cause: anyhow::Error,
    },

    #[error("saving {}: {cause:#}", .path.display())]
    Save {
        path: PathBuf,
        cause: anyhow::Error,
    },

    #[error("configuration: {0:#}")]
    Config(anyhow::Error),
}

impl PlotError {
    /// Process exit status for this failure.
    ///
    /// Argument errors get their own status so callers can tell a usage
    /// mistake apart from missing data.
    pub fn exit_code(&self) -> i32 {
        match self {
            PlotError::InvalidArguments(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;
