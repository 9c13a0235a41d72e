use eframe::egui;

use crate::state::{AppState, View};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BenchplotApp {
    pub state: AppState,
}

impl BenchplotApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for BenchplotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: figures ----
        egui::SidePanel::left("figure_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart or table ----
        egui::CentralPanel::default().show(ctx, |ui| match (self.state.view, &self.state.table) {
            (View::Table, Some(table)) => panels::table_view(ui, table),
            _ => plot::figure_plot(ui, self.state.selected_figure()),
        });
    }
}
