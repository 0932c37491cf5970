use eframe::egui::{self, RichText, TextEdit, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::OUT_OF_LIMITS_COLOR;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
enum Edit {
    Passing(usize),
    Retained(usize),
}

// ---------------------------------------------------------------------------
// Gradation table (bottom panel)
// ---------------------------------------------------------------------------

/// Render the editable gradation table. Limits are read-only; passing and
/// weight-retained cells commit when they lose focus.
pub fn gradation_table(ui: &mut Ui, state: &mut AppState) {
    let spec = state.spec().clone();
    let retained_pct = state.retained_percent();
    let mut commit: Option<Edit> = None;

    TableBuilder::new(ui)
        .striped(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(110.0))
        .columns(Column::auto().at_least(100.0), 2)
        .column(Column::auto().at_least(100.0))
        .column(Column::auto().at_least(100.0))
        .column(Column::remainder().at_least(140.0))
        .header(24.0, |mut header| {
            for title in [
                "Sieve Size (mm)",
                "Lower Limit (%)",
                "Upper Limit (%)",
                "% Passing",
                "% Retained",
                "Weight Retained (g)",
            ] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(26.0, spec.len(), |mut row| {
                let i = row.index();
                let outside = state.out_of_limits(i);

                row.col(|ui| {
                    ui.label(spec.sieve_sizes()[i].to_string());
                });
                row.col(|ui| {
                    ui.label(format!("{:.0}", spec.lower_limits()[i]));
                });
                row.col(|ui| {
                    ui.label(format!("{:.0}", spec.upper_limits()[i]));
                });
                row.col(|ui| {
                    let mut edit = TextEdit::singleline(&mut state.passing_text[i]);
                    if outside {
                        edit = edit.text_color(OUT_OF_LIMITS_COLOR);
                    }
                    if ui.add(edit.desired_width(80.0)).lost_focus() {
                        commit = Some(Edit::Passing(i));
                    }
                });
                row.col(|ui| {
                    ui.label(RichText::new(format!("{:.2}", retained_pct[i])).weak());
                });
                row.col(|ui| {
                    let edit = TextEdit::singleline(&mut state.retained_text[i]).desired_width(100.0);
                    if ui.add(edit).lost_focus() {
                        commit = Some(Edit::Retained(i));
                    }
                });
            });
        });

    // Rejections are reported through `state.status`.
    match commit {
        Some(Edit::Passing(i)) => {
            let text = state.passing_text[i].clone();
            let _ = state.edit_passing(i, &text);
        }
        Some(Edit::Retained(i)) => {
            let text = state.retained_text[i].clone();
            let _ = state.edit_retained(i, &text);
        }
        None => {}
    }
}
