use eframe::egui;

use crate::color::MaterialColors;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GradationApp {
    pub state: AppState,
    colors: MaterialColors,
}

impl GradationApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            colors: MaterialColors::default(),
        }
    }
}

impl eframe::App for GradationApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + material tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &self.colors);
        });

        // ---- Left side panel: inputs ----
        egui::SidePanel::left("input_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: gradation table ----
        egui::TopBottomPanel::bottom("table_panel")
            .resizable(true)
            .min_height(200.0)
            .show(ctx, |ui| {
                table::gradation_table(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::gradation_plot(ui, &mut self.state, &self.colors);
        });
    }
}
