/// Forecast layer: configuration, engine, and orchestration.
///
/// Architecture:
/// ```text
///   ┌────────────┐      ┌──────────────┐
///   │   config    │      │ AdaptedSeries │
///   │ (collector) │      │  (ds, y, …)   │
///   └────────────┘      └──────────────┘
///          │                    │
///          └──────┬─────────────┘
///                 ▼
///         ┌──────────────┐
///         │ orchestrator  │  validate → attach bounds → fit → predict
///         └──────────────┘
///                 │
///                 ▼
///         ┌──────────────┐
///         │    engine     │  Fittable (MSTL + AutoETS backend)
///         └──────────────┘
/// ```
pub mod config;
pub mod engine;
pub mod orchestrator;

use thiserror::Error;

use self::config::ConfigError;

/// Failures while producing a forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The configuration breaks an invariant; nothing was fitted.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The engine could not fit or predict from the provided series.
    #[error("could not fit the series: {0}")]
    Fit(String),

    /// The requested horizon is unusable.
    #[error("forecast horizon must be positive, got {0}")]
    InvalidHorizon(u32),
}
