use std::panic::{catch_unwind, AssertUnwindSafe};

use anyhow::{anyhow, Result};
use eframe::egui;

use crate::figure::Figure;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

/// Window showing one finished chart.
pub struct CurveViewerApp {
    pub figure: Figure,
}

impl CurveViewerApp {
    pub fn new(figure: Figure) -> Self {
        Self { figure }
    }
}

impl eframe::App for CurveViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.figure);
        });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::figure_plot(ui, &self.figure);
        });
    }
}

/// Show `figure` in a window and block until it is closed.
///
/// Fails when no window can be opened, e.g. without a display. Panics from
/// the windowing backend are caught and reported as errors.
pub fn show(figure: &Figure) -> Result<()> {
    let (width, height) = figure.canvas_size();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width as f32, height as f32 + 40.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    let app = CurveViewerApp::new(figure.clone());
    let title = figure.title.clone();
    let outcome = catch_unwind(AssertUnwindSafe(move || {
        eframe::run_native(&title, options, Box::new(|_cc| Ok(Box::new(app))))
    }));

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(anyhow!("{e}")),
        Err(_) => Err(anyhow!("window backend panicked")),
    }
}
