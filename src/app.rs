use eframe::egui;

use crate::data::loader::RemoteCsvSource;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CasecastApp {
    pub state: AppState,
}

impl CasecastApp {
    pub fn new() -> Self {
        Self {
            state: AppState::new(Box::new(RemoteCsvSource::new())),
        }
    }
}

impl Default for CasecastApp {
    fn default() -> Self {
        Self::new()
    }
}

impl eframe::App for CasecastApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // First frame: load the data and produce the initial forecast.
        if !self.state.bootstrapped {
            self.state.bootstrapped = true;
            self.state.run_pipeline();
        }

        // ---- Top panel: identity, reload, notices ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: forecasting controls ----
        let mut changed = false;
        egui::SidePanel::left("controls_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                changed = panels::side_panel(ui, &mut self.state.controls);
            });
        if changed {
            self.state.run_pipeline();
        }

        // ---- Bottom panel: raw data preview ----
        egui::TopBottomPanel::bottom("data_preview")
            .resizable(true)
            .default_height(170.0)
            .show(ctx, |ui| {
                panels::data_preview(ui, &self.state);
            });

        // ---- Central panel: forecast charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::forecast_plots(ui, &self.state);
        });
    }
}
