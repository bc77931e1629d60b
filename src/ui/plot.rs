use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Forecast charts (central panel)
// ---------------------------------------------------------------------------

const BAND_COLOR: Color32 = Color32::from_rgb(90, 120, 160);

/// Render the overall forecast and the component decomposition, stacked.
pub fn forecast_plots(ui: &mut Ui, state: &AppState) {
    let (Some(overall), Some(components)) = (&state.overall, &state.components) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Adjust the parameters to generate a forecast");
        });
        return;
    };

    let half = (ui.available_height() / 2.0 - 24.0).max(120.0);

    ui.strong(format!("Forecast for {} days", state.controls.horizon));
    Plot::new("overall_forecast")
        .legend(Legend::default())
        .height(half)
        .x_axis_label("Days since 1970-01-01")
        .y_axis_label("Cases")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let lower: PlotPoints = overall.lower.iter().copied().collect();
            plot_ui.line(
                Line::new(lower)
                    .name("lower bound")
                    .color(BAND_COLOR)
                    .width(0.8),
            );
            let upper: PlotPoints = overall.upper.iter().copied().collect();
            plot_ui.line(
                Line::new(upper)
                    .name("upper bound")
                    .color(BAND_COLOR)
                    .width(0.8),
            );
            let forecast: PlotPoints = overall.forecast.iter().copied().collect();
            plot_ui.line(
                Line::new(forecast)
                    .name("forecast")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
            let actual: PlotPoints = overall.actual.iter().copied().collect();
            plot_ui.points(
                Points::new(actual)
                    .name("observed")
                    .color(Color32::WHITE)
                    .radius(1.5),
            );
        });

    ui.separator();

    ui.strong("Forecast components");
    Plot::new("forecast_components")
        .legend(Legend::default())
        .x_axis_label("Days since 1970-01-01")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let trend: PlotPoints = components.trend.iter().copied().collect();
            plot_ui.line(
                Line::new(trend)
                    .name("trend")
                    .color(Color32::LIGHT_GREEN)
                    .width(1.5),
            );
            let weekly: PlotPoints = components.weekly.iter().copied().collect();
            plot_ui.line(
                Line::new(weekly)
                    .name("weekly")
                    .color(Color32::LIGHT_RED)
                    .width(1.0),
            );
            if let Some(yearly) = &components.yearly {
                let yearly: PlotPoints = yearly.iter().copied().collect();
                plot_ui.line(
                    Line::new(yearly)
                        .name("yearly")
                        .color(Color32::GOLD)
                        .width(1.0),
                );
            }
        });
}
