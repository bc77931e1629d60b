use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::forecast::config::{
    ControlsState, GrowthModel, SeasonalityMode, BOUND_STEP, MAX_HORIZON, MIN_HORIZON,
};
use crate::state::{AppState, Severity};

// ---------------------------------------------------------------------------
// Left side panel – forecasting controls
// ---------------------------------------------------------------------------

/// Render the parameter controls. Returns whether anything changed, so the
/// caller can re-run the pipeline.
pub fn side_panel(ui: &mut Ui, controls: &mut ControlsState) -> bool {
    let mut changed = false;

    ui.heading("Parameters");
    ui.separator();
    ui.label("Modify the algorithm settings; the forecast re-runs on every change.");
    ui.add_space(4.0);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::CollapsingHeader::new(RichText::new("Horizon").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.label("Future periods (days) to forecast:");
                    changed |= ui
                        .add(
                            egui::DragValue::new(&mut controls.horizon)
                                .range(MIN_HORIZON..=MAX_HORIZON),
                        )
                        .changed();
                });

            egui::CollapsingHeader::new(RichText::new("Seasonality").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.label(
                        "Whether seasonal effects are added to or multiplied with the trend.",
                    );
                    for mode in [SeasonalityMode::Additive, SeasonalityMode::Multiplicative] {
                        changed |= ui
                            .radio_value(&mut controls.seasonality, mode, mode.to_string())
                            .changed();
                    }
                });

            egui::CollapsingHeader::new(RichText::new("Trend components").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.label("Add or remove components:");
                    changed |= ui
                        .checkbox(&mut controls.components.weekly, "Weekly")
                        .changed();
                    changed |= ui
                        .checkbox(&mut controls.components.monthly, "Monthly")
                        .changed();
                    changed |= ui
                        .checkbox(&mut controls.components.yearly, "Yearly")
                        .changed();
                });

            egui::CollapsingHeader::new(RichText::new("Growth model").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.label("Unbounded (linear) or saturating (logistic) trend.");
                    for growth in [GrowthModel::Linear, GrowthModel::Logistic] {
                        changed |= ui
                            .radio_value(&mut controls.growth, growth, growth.to_string())
                            .changed();
                    }

                    if controls.growth == GrowthModel::Logistic {
                        ui.add_space(4.0);
                        ui.label("Configure saturation:");
                        changed |= ui
                            .add(
                                egui::Slider::new(&mut controls.cap, 0.0..=1.0)
                                    .step_by(BOUND_STEP)
                                    .text("Cap"),
                            )
                            .changed();
                        changed |= ui
                            .add(
                                egui::Slider::new(&mut controls.floor, 0.0..=1.0)
                                    .step_by(BOUND_STEP)
                                    .text("Floor"),
                            )
                            .changed();

                        if controls.floor > controls.cap {
                            ui.label(
                                RichText::new("Invalid settings: cap must be higher than floor.")
                                    .color(Color32::RED),
                            );
                        } else if controls.floor == controls.cap {
                            ui.label(
                                RichText::new("Cap must be higher than floor.")
                                    .color(Color32::YELLOW),
                            );
                        }
                    }
                });
        });

    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top bar: identity, reload, dataset summary, notices.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong("Casecast");
        ui.label("– forecast online case workload");
        ui.separator();

        if ui.button("Reload data").clicked() {
            state.reload();
        }

        ui.separator();

        if let Some(table) = &state.raw {
            ui.label(format!(
                "{} rows loaded ({} columns)",
                table.len(),
                table.columns.len()
            ));
        } else {
            ui.label("Loading data…");
        }

        for notice in &state.notices {
            ui.separator();
            let color = match notice.severity {
                Severity::Warning => Color32::YELLOW,
                Severity::Error => Color32::RED,
            };
            ui.label(RichText::new(&notice.text).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Bottom panel – raw data preview
// ---------------------------------------------------------------------------

/// Render a tabular preview of the loaded historical data.
pub fn data_preview(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.raw else {
        ui.label("No data loaded yet.");
        return;
    };

    ui.strong("Loaded historical data");
    ui.add_space(2.0);

    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::auto().at_least(90.0), table.columns.len())
        .header(18.0, |mut header| {
            for name in &table.columns {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(16.0, table.len(), |mut row| {
                let record = &table.rows[row.index()];
                for name in &table.columns {
                    row.col(|ui| {
                        let text = record
                            .get(name)
                            .map(|v| v.to_string())
                            .unwrap_or_default();
                        ui.label(text);
                    });
                }
            });
        });
}
