use eframe::egui::{self, Color32, RichText, Ui};

use gradation::engine::{FmMode, MaterialKind};

use crate::color::MaterialColors;
use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – inputs and results
// ---------------------------------------------------------------------------

/// Render the input panel: total weight, random curve, copy, FM.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Input Settings");
    ui.separator();

    ui.label("Total Weight (g):");
    let weight = ui.add(egui::TextEdit::singleline(&mut state.weight_text).desired_width(140.0));
    if weight.lost_focus() {
        // Rejected input resets the field and sets the status line.
        let _ = state.commit_weight_text();
    }

    ui.add_space(16.0);

    if ui.button("Generate Random Curve").clicked() {
        let _ = state.randomize();
    }

    if ui.button("Copy Weight Retained").clicked() {
        let text = state.retained_clipboard_text();
        ui.ctx().copy_text(text);
        log::info!("copied retained weights to clipboard");
        state.status = Some(Status::Info("weight retained copied to clipboard".to_string()));
    }

    ui.add_space(16.0);
    ui.separator();

    ui.strong("Fineness Modulus");
    ui.label(RichText::new(format!("{:.3}", state.fm())).size(22.0));

    let mut mode = state.fm_mode;
    egui::ComboBox::from_id_salt("fm_mode")
        .selected_text(mode.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for m in FmMode::ALL {
                ui.selectable_value(&mut mode, m, m.to_string());
            }
        });
    state.set_fm_mode(mode);

    ui.add_space(8.0);
    ui.label(
        RichText::new(format!(
            "Σ retained: {:.2} g",
            state.retained().iter().sum::<f64>()
        ))
        .weak(),
    );
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, material tabs and status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, colors: &MaterialColors) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export CSV…").clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for kind in MaterialKind::ALL {
            let selected = state.material == kind;
            let mut text = RichText::new(kind.display_name()).strong();
            if selected {
                text = text.color(colors.color_for(kind));
            }
            if ui.selectable_label(selected, text).clicked() {
                state.select_material(kind);
            }
        }

        ui.separator();

        match &state.status {
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Status::Info(msg)) => {
                ui.label(msg);
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn dialog(state: &AppState) -> rfd::FileDialog {
    let mut dialog = rfd::FileDialog::new();
    if let Some(dir) = state.settings.last_file.as_ref().and_then(|p| p.parent()) {
        dialog = dialog.set_directory(dir);
    }
    dialog
}

pub fn open_file_dialog(state: &mut AppState) {
    let file = dialog(state)
        .set_title("Open gradation table")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open_file(&path) {
            log::error!("Failed to load file: {e:#}");
            state.status = Some(Status::Error(format!("Error: {e:#}")));
        }
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = dialog(state)
        .set_title("Export gradation table")
        .set_file_name(format!("{}.csv", state.material.key()))
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_csv(&path) {
            log::error!("Failed to export table: {e:#}");
            state.status = Some(Status::Error(format!("Error: {e:#}")));
        }
    }
}
