use std::sync::Arc;

use crate::data::adapter;
use crate::data::loader::{CaseSource, DataLoader};
use crate::data::model::CaseTable;
use crate::forecast::config::ControlsState;
use crate::forecast::engine::ForecastTable;
use crate::forecast::orchestrator;
use crate::presentation::{self, ComponentsChart, OverallChart};

/// Rows fetched from the remote source.
pub const ROW_LIMIT: u32 = 1000;

// ---------------------------------------------------------------------------
// Notices shown in the top bar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    loader: DataLoader,

    /// Row limit passed to the loader; doubles as its cache key.
    pub row_limit: u32,

    /// Loaded dataset, shared with the loader's cache.
    pub raw: Option<Arc<CaseTable>>,

    /// Forecasting controls as the user left them.
    pub controls: ControlsState,

    /// Last successful prediction table.
    pub forecast: Option<ForecastTable>,

    /// Chart objects derived from the last successful run.
    pub overall: Option<OverallChart>,
    pub components: Option<ComponentsChart>,

    /// Warnings and errors from the last run.
    pub notices: Vec<Notice>,

    /// Whether the first-frame pipeline run has happened.
    pub bootstrapped: bool,
}

impl AppState {
    pub fn new(source: Box<dyn CaseSource>) -> Self {
        Self {
            loader: DataLoader::new(source),
            row_limit: ROW_LIMIT,
            raw: None,
            controls: ControlsState::default(),
            forecast: None,
            overall: None,
            components: None,
            notices: Vec::new(),
            bootstrapped: false,
        }
    }

    /// Run the full pipeline: load (cache-checked) → adapt → collect
    /// parameters → orchestrate → build charts.
    ///
    /// Any failure is terminal for this interaction: the error is surfaced
    /// as a notice and the previous forecast is cleared.
    pub fn run_pipeline(&mut self) {
        self.notices.clear();
        if let Err(text) = self.try_pipeline() {
            log::error!("pipeline failed: {text}");
            self.forecast = None;
            self.overall = None;
            self.components = None;
            self.notices.push(Notice {
                severity: Severity::Error,
                text,
            });
        }
    }

    /// Drop the cached data for the current row limit and re-run.
    pub fn reload(&mut self) {
        self.loader.invalidate(self.row_limit);
        self.run_pipeline();
    }

    fn try_pipeline(&mut self) -> Result<(), String> {
        let table = self
            .loader
            .load(self.row_limit)
            .map_err(|e| e.to_string())?;
        self.raw = Some(Arc::clone(&table));

        let adapted = adapter::adapt(&table).map_err(|e| e.to_string())?;

        if let Some(warning) = self.controls.warning() {
            self.notices.push(Notice {
                severity: Severity::Warning,
                text: warning,
            });
        }
        let config = self.controls.to_config().map_err(|e| e.to_string())?;

        let result = orchestrator::run(&adapted, &config).map_err(|e| e.to_string())?;

        self.overall =
            Some(presentation::overall_chart(&result).map_err(|e| e.to_string())?);
        self.components =
            Some(presentation::components_chart(&result).map_err(|e| e.to_string())?);
        self.forecast = Some(result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{parse_csv, CaseSource};
    use crate::data::DataError;
    use crate::forecast::config::GrowthModel;

    struct StaticSource {
        csv: String,
    }

    impl CaseSource for StaticSource {
        fn fetch(&self, row_limit: u32) -> Result<CaseTable, DataError> {
            parse_csv(&self.csv, row_limit)
        }
    }

    fn daily_csv(n: usize) -> String {
        let mut csv = String::from("to_date,count_new_cases\n");
        let start = chrono::NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        for i in 0..n {
            let day = start + chrono::Duration::days(i as i64);
            csv.push_str(&format!("{day},{}\n", 100 + (i % 7) * 10));
        }
        csv
    }

    fn state_with(csv: String) -> AppState {
        AppState::new(Box::new(StaticSource { csv }))
    }

    #[test]
    fn successful_run_populates_forecast_and_charts() {
        let mut state = state_with(daily_csv(60));
        state.controls.horizon = 30;

        state.run_pipeline();

        assert!(state.notices.is_empty());
        let forecast = state.forecast.as_ref().unwrap();
        assert_eq!(forecast.len(), 90);
        assert!(state.overall.is_some());
        assert!(state.components.is_some());
        assert_eq!(state.raw.as_ref().unwrap().len(), 60);
    }

    #[test]
    fn floor_above_cap_surfaces_an_error_and_clears_output() {
        let mut state = state_with(daily_csv(60));
        state.run_pipeline();
        assert!(state.forecast.is_some());

        state.controls.growth = GrowthModel::Logistic;
        state.controls.cap = 0.3;
        state.controls.floor = 0.5;
        state.run_pipeline();

        assert!(state.forecast.is_none());
        assert!(state.overall.is_none());
        assert!(state
            .notices
            .iter()
            .any(|n| n.severity == Severity::Error && n.text.contains("cap")));
    }

    #[test]
    fn equal_bounds_warn_but_still_forecast() {
        let mut state = state_with(daily_csv(60));
        state.controls.growth = GrowthModel::Logistic;
        state.controls.cap = 0.4;
        state.controls.floor = 0.4;

        state.run_pipeline();

        assert!(state
            .notices
            .iter()
            .any(|n| n.severity == Severity::Warning));
        assert!(state.forecast.is_some());
    }

    #[test]
    fn missing_count_column_is_surfaced() {
        let mut state = state_with("to_date,cases\n2022-01-01,5\n2022-01-02,6\n".to_string());

        state.run_pipeline();

        assert!(state.forecast.is_none());
        assert!(state
            .notices
            .iter()
            .any(|n| n.severity == Severity::Error && n.text.contains("count_new_cases")));
    }

    #[test]
    fn rerun_reuses_the_cache_but_reload_does_not() {
        use std::cell::Cell;
        use std::rc::Rc;

        struct CountingSource {
            calls: Rc<Cell<u32>>,
            csv: String,
        }
        impl CaseSource for CountingSource {
            fn fetch(&self, row_limit: u32) -> Result<CaseTable, DataError> {
                self.calls.set(self.calls.get() + 1);
                parse_csv(&self.csv, row_limit)
            }
        }

        let calls = Rc::new(Cell::new(0));
        let mut state = AppState::new(Box::new(CountingSource {
            calls: Rc::clone(&calls),
            csv: daily_csv(30),
        }));

        state.run_pipeline();
        state.run_pipeline();
        assert_eq!(calls.get(), 1);

        state.reload();
        assert_eq!(calls.get(), 2);
    }
}
