use eframe::egui::Ui;
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints, Points};

use crate::color::{MaterialColors, LIMIT_COLOR, OUT_OF_LIMITS_COLOR};
use crate::state::AppState;

/// How close (in % passing) a press must land to a point to grab it.
const GRAB_DISTANCE: f64 = 6.0;

// ---------------------------------------------------------------------------
// Gradation chart (central panel)
// ---------------------------------------------------------------------------

fn series(values: &[f64]) -> PlotPoints {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| [i as f64, v])
        .collect()
}

/// Render limits and the obtained curve; points can be dragged vertically.
///
/// X positions are sieve indices (largest sieve on the left), labelled with
/// the sieve sizes.
pub fn gradation_plot(ui: &mut Ui, state: &mut AppState, colors: &MaterialColors) {
    let spec = state.spec().clone();
    let passing = state.passing().to_vec();
    let curve_color = colors.color_for(state.material);

    let labels: Vec<String> = spec.sieve_sizes().iter().map(|s| s.to_string()).collect();
    let n = labels.len();

    let plot_response = Plot::new("gradation_plot")
        .legend(Legend::default())
        .x_axis_label("Sieve size (mm)")
        .y_axis_label("% Passing")
        .include_x(-0.5)
        .include_x(n as f64 - 0.5)
        .include_y(0.0)
        .include_y(105.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(series(spec.lower_limits()))
                    .name("Lower limit")
                    .color(LIMIT_COLOR)
                    .style(LineStyle::dashed_loose())
                    .width(1.2),
            );
            plot_ui.line(
                Line::new(series(spec.upper_limits()))
                    .name("Upper limit")
                    .color(LIMIT_COLOR)
                    .style(LineStyle::dashed_loose())
                    .width(1.2),
            );
            plot_ui.line(
                Line::new(series(&passing))
                    .name("Obtained")
                    .color(curve_color)
                    .width(2.5),
            );
            plot_ui.points(
                Points::new(series(&passing))
                    .name("Obtained")
                    .color(curve_color)
                    .radius(5.0),
            );

            let outside: Vec<[f64; 2]> = (0..n)
                .filter(|&i| state.out_of_limits(i))
                .map(|i| [i as f64, passing[i]])
                .collect();
            if !outside.is_empty() {
                plot_ui.points(
                    Points::new(PlotPoints::from(outside))
                        .name("Outside limits")
                        .color(OUT_OF_LIMITS_COLOR)
                        .radius(6.0),
                );
            }
        });

    // ---- Drag handling: request/response through the core clamp ----
    let response = &plot_response.response;
    let pointer = response
        .interact_pointer_pos()
        .map(|pos| plot_response.transform.value_from_position(pos));

    if response.drag_started() {
        state.drag_index = pointer.and_then(|p| nearest_point(&passing, p.x, p.y));
    }
    if response.dragged() {
        if let (Some(idx), Some(p)) = (state.drag_index, pointer) {
            if let Err(e) = state.drag_point(idx, p.y) {
                log::warn!("drag rejected: {e}");
                state.drag_index = None;
            }
        }
    }
    if response.drag_stopped() {
        state.drag_index = None;
    }
}

/// Index of the point under the pointer, if it is close enough to grab.
fn nearest_point(passing: &[f64], x: f64, y: f64) -> Option<usize> {
    if passing.is_empty() {
        return None;
    }
    let idx = x.round().clamp(0.0, (passing.len() - 1) as f64) as usize;
    ((passing[idx] - y).abs() < GRAB_DISTANCE).then_some(idx)
}
