use eframe::egui::{self, RichText, Ui};

use crate::figure::Figure;

// ---------------------------------------------------------------------------
// Top bar – chart title and window controls
// ---------------------------------------------------------------------------

/// Render the top bar: title on the left, point count and Close on the right.
pub fn top_bar(ui: &mut Ui, figure: &Figure) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(&figure.title).strong().size(16.0));

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
            if ui.button("Close").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
            let points: usize = figure.series.iter().map(|s| s.points.len()).sum();
            ui.weak(format!("{points} points"));
        });
    });
}
