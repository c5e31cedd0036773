//! Offline plotting for test-bench measurement data.
//!
//! Two independent pipelines share the data, figure and render layers:
//! - [`overlay`]: SLDO VI curves from eight CB positions, one PNG per parameter.
//! - [`iv`]: a single module hybrid's reverse-bias IV curve, PNG plus PDF.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod figure;
pub mod iv;
pub mod overlay;
pub mod render;
pub mod ui;

pub use error::{PlotError, Result};

/// Initialise `env_logger` with `info` as the default level.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
}
