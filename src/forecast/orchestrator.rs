use super::config::ForecastConfig;
use super::engine::{Fittable, ForecastTable, SeasonalTrendEngine};
use super::ForecastError;
use crate::data::model::AdaptedSeries;

// ---------------------------------------------------------------------------
// Orchestration: validate → attach bounds → fit → extend → predict
// ---------------------------------------------------------------------------

/// Produce a forecast for the adapted series under the given configuration.
///
/// Validation runs before the engine is even constructed: an invalid
/// configuration never reaches a fit.
pub fn run(
    adapted: &AdaptedSeries,
    config: &ForecastConfig,
) -> Result<ForecastTable, ForecastError> {
    config.validate()?;
    let mut engine = SeasonalTrendEngine::new(config.seasonality, config.growth);
    run_with(&mut engine, adapted, config)
}

/// Orchestrate against any [`Fittable`] backend.
pub fn run_with(
    engine: &mut dyn Fittable,
    adapted: &AdaptedSeries,
    config: &ForecastConfig,
) -> Result<ForecastTable, ForecastError> {
    config.validate()?;

    let mut table = adapted.clone();
    table.attach_bounds(config.bounds.cap, config.bounds.floor);

    engine.fit(&table)?;
    let future = engine.future_frame(config.horizon)?;
    let result = engine.predict(&future)?;
    log::info!(
        "forecast complete: {} rows over a {} day horizon",
        result.len(),
        config.horizon
    );
    Ok(result)
}
