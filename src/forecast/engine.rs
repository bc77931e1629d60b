//! Forecasting engine: seasonal-trend decomposition over an ETS backbone.
//!
//! The engine consumes an [`AdaptedSeries`] (`ds`, `y`, optional `cap` /
//! `floor` columns) and produces one row per historical and future date.
//!
//! Growth and seasonality modes map to a value transform applied before the
//! statistical backend sees the series:
//!
//! - additive / linear: identity
//! - multiplicative: `ln(1 + y)`
//! - logistic: a clamped logit between the absolute bounds derived from the
//!   attached `cap` / `floor` fractions of the historical peak
//!
//! Future values come from augurs (MSTL with weekly seasonality over an
//! AutoETS trend model when enough history exists, plain AutoETS otherwise);
//! historical fitted values and the component columns come from a classical
//! decomposition computed in transform space.

use std::collections::BTreeMap;

use augurs::{
    ets::AutoETS,
    forecaster::{transforms::LinearInterpolator, Forecaster, Transformer},
    mstl::MSTLModel,
};
use chrono::{Datelike, Duration, NaiveDate};

use super::ForecastError;
use crate::data::model::AdaptedSeries;
use crate::forecast::config::{GrowthModel, SeasonalityMode};

/// Minimum distinct time points required to fit.
pub const MIN_FIT_POINTS: usize = 2;

/// Minimum points for seasonal (MSTL) forecasting: two full weeks.
const MIN_SEASONAL_POINTS: usize = 14;

/// Weekly seasonality period, in days.
const WEEKLY_PERIOD: usize = 7;

/// History span required before a yearly component is estimated.
const YEARLY_MIN_SPAN_DAYS: i64 = 730;

/// Confidence level for prediction intervals.
const CONFIDENCE_LEVEL: f64 = 0.95;

/// Normal quantile matching [`CONFIDENCE_LEVEL`], for in-sample bands.
const INTERVAL_Z: f64 = 1.96;

/// Margin keeping logit inputs inside the open unit interval.
const LOGIT_MARGIN: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Output table
// ---------------------------------------------------------------------------

/// One prediction row.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub ds: NaiveDate,
    /// Observed value, present on historical rows only.
    pub actual: Option<f64>,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    /// Trend contribution, in observation units.
    pub trend: f64,
    /// Weekly seasonal contribution, in transform space.
    pub weekly: f64,
    /// Yearly seasonal contribution, when enough history exists.
    pub yearly: Option<f64>,
}

/// The full prediction table: historical range plus horizon.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastTable {
    pub rows: Vec<ForecastRow>,
}

impl ForecastTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The extended timeline to predict over: the fitted daily grid plus the
/// requested horizon, carrying the same saturation bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct FutureFrame {
    pub dates: Vec<NaiveDate>,
    pub cap: f64,
    pub floor: f64,
}

// ---------------------------------------------------------------------------
// Capability interface
// ---------------------------------------------------------------------------

/// A forecasting backend: fit on an adapted series, extend the timeline,
/// predict over it. Any conforming implementation satisfies the
/// orchestrator's contract.
pub trait Fittable {
    fn fit(&mut self, data: &AdaptedSeries) -> Result<(), ForecastError>;
    fn future_frame(&self, horizon: u32) -> Result<FutureFrame, ForecastError>;
    fn predict(&self, future: &FutureFrame) -> Result<ForecastTable, ForecastError>;
}

// ---------------------------------------------------------------------------
// Value transforms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum ValueTransform {
    Identity,
    Log1p,
    /// Clamped logit between absolute bounds `[floor, floor + width]`.
    Logit { floor: f64, width: f64 },
}

impl ValueTransform {
    fn apply(self, y: f64) -> f64 {
        match self {
            ValueTransform::Identity => y,
            ValueTransform::Log1p => (1.0 + y.max(0.0)).ln(),
            ValueTransform::Logit { floor, width } => {
                let p = ((y - floor) / width).clamp(LOGIT_MARGIN, 1.0 - LOGIT_MARGIN);
                (p / (1.0 - p)).ln()
            }
        }
    }

    fn invert(self, z: f64) -> f64 {
        match self {
            ValueTransform::Identity => z,
            ValueTransform::Log1p => z.exp() - 1.0,
            ValueTransform::Logit { floor, width } => floor + width / (1.0 + (-z).exp()),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The crate's [`Fittable`] implementation.
pub struct SeasonalTrendEngine {
    seasonality: SeasonalityMode,
    growth: GrowthModel,
    fitted: Option<FittedState>,
}

struct FittedState {
    /// Contiguous daily grid from first to last observed date.
    dates: Vec<NaiveDate>,
    /// Observed values per grid date; `None` where the source had a gap.
    observed: Vec<Option<f64>>,
    /// Transform-space values, gaps filled by linear interpolation.
    values: Vec<f64>,
    transform: ValueTransform,
    /// Saturation bounds as attached to the fit input.
    cap: f64,
    floor: f64,
    /// Centered moving-average trend, transform space.
    trend: Vec<f64>,
    /// Seasonal deviation per weekday (Monday-first), transform space.
    weekly: [f64; 7],
    /// Seasonal deviation per day-of-year, when the span allows it.
    yearly: Option<Vec<f64>>,
    /// Residual spread for in-sample intervals.
    resid_sd: f64,
}

impl SeasonalTrendEngine {
    pub fn new(seasonality: SeasonalityMode, growth: GrowthModel) -> Self {
        Self {
            seasonality,
            growth,
            fitted: None,
        }
    }

    fn fitted(&self) -> Result<&FittedState, ForecastError> {
        self.fitted
            .as_ref()
            .ok_or_else(|| ForecastError::Fit("engine has not been fitted".to_string()))
    }

    fn choose_transform(&self, cap: f64, floor: f64, y_max: f64) -> ValueTransform {
        let unbounded = match self.seasonality {
            SeasonalityMode::Additive => ValueTransform::Identity,
            SeasonalityMode::Multiplicative => ValueTransform::Log1p,
        };
        match self.growth {
            GrowthModel::Linear => unbounded,
            GrowthModel::Logistic => {
                let scale = if y_max > 0.0 { y_max } else { 1.0 };
                let lo = floor * scale;
                let width = (cap - floor) * scale;
                if width <= f64::EPSILON {
                    // Zero-width band: degrade instead of crashing.
                    log::warn!("saturation band has zero width, fitting without bounds");
                    unbounded
                } else {
                    ValueTransform::Logit { floor: lo, width }
                }
            }
        }
    }
}

impl Fittable for SeasonalTrendEngine {
    fn fit(&mut self, data: &AdaptedSeries) -> Result<(), ForecastError> {
        let dates = data.dates().map_err(ForecastError::Fit)?;
        let raw = data.values();

        for (date, value) in dates.iter().zip(&raw) {
            if !value.is_finite() {
                return Err(ForecastError::Fit(format!(
                    "non-finite value at {date}"
                )));
            }
        }

        // Later rows win on duplicate dates; the map also sorts the series.
        let by_date: BTreeMap<NaiveDate, f64> = dates.into_iter().zip(raw).collect();
        if by_date.len() < MIN_FIT_POINTS {
            return Err(ForecastError::Fit(format!(
                "need at least {MIN_FIT_POINTS} distinct time points, got {}",
                by_date.len()
            )));
        }

        let (first, last) = match (by_date.keys().next(), by_date.keys().next_back()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(ForecastError::Fit("empty series".to_string())),
        };

        let mut grid = Vec::new();
        let mut observed = Vec::new();
        let mut day = first;
        while day <= last {
            grid.push(day);
            observed.push(by_date.get(&day).copied());
            day += Duration::days(1);
        }

        let y_max = observed
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let (cap, floor) = data.bounds().unwrap_or((1.0, 0.0));
        let transform = self.choose_transform(cap, floor, y_max);

        let sparse: Vec<f64> = observed
            .iter()
            .map(|o| o.map(|y| transform.apply(y)).unwrap_or(f64::NAN))
            .collect();
        let values = fill_gaps(&sparse);

        let trend = moving_average(&values, WEEKLY_PERIOD);
        let detrended: Vec<f64> = values.iter().zip(&trend).map(|(v, t)| v - t).collect();
        let weekly = weekday_means(&grid, &detrended);

        let span = (last - first).num_days();
        let yearly = (span >= YEARLY_MIN_SPAN_DAYS).then(|| {
            let residual: Vec<f64> = grid
                .iter()
                .zip(&detrended)
                .map(|(d, v)| v - weekly[weekday_index(*d)])
                .collect();
            day_of_year_means(&grid, &residual)
        });

        let resid_sd = {
            let residuals: Vec<f64> = grid
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    let seasonal = weekly[weekday_index(*d)]
                        + yearly
                            .as_ref()
                            .map(|y| y[day_of_year_index(*d)])
                            .unwrap_or(0.0);
                    values[i] - trend[i] - seasonal
                })
                .collect();
            std_dev(&residuals)
        };

        log::info!(
            "fitted {} grid days ({span} day span, {} observed), transform {transform:?}",
            grid.len(),
            observed.iter().flatten().count()
        );

        self.fitted = Some(FittedState {
            dates: grid,
            observed,
            values,
            transform,
            cap,
            floor,
            trend,
            weekly,
            yearly,
            resid_sd,
        });
        Ok(())
    }

    fn future_frame(&self, horizon: u32) -> Result<FutureFrame, ForecastError> {
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon(horizon));
        }
        let fitted = self.fitted()?;
        let last = match fitted.dates.last() {
            Some(last) => *last,
            None => return Err(ForecastError::Fit("fitted grid is empty".to_string())),
        };

        let dates = fitted
            .dates
            .iter()
            .copied()
            .chain((1..=i64::from(horizon)).map(|i| last + Duration::days(i)))
            .collect();
        Ok(FutureFrame {
            dates,
            cap: fitted.cap,
            floor: fitted.floor,
        })
    }

    fn predict(&self, future: &FutureFrame) -> Result<ForecastTable, ForecastError> {
        let fitted = self.fitted()?;
        let n_hist = fitted.dates.len();
        if future.dates.len() < n_hist || future.dates[..n_hist] != fitted.dates[..] {
            return Err(ForecastError::Fit(
                "future frame does not extend the fitted history".to_string(),
            ));
        }
        let horizon = future.dates.len() - n_hist;
        let t = fitted.transform;

        let mut rows = Vec::with_capacity(future.dates.len());
        for (i, &ds) in fitted.dates.iter().enumerate() {
            let weekly = fitted.weekly[weekday_index(ds)];
            let yearly = fitted
                .yearly
                .as_ref()
                .map(|y| y[day_of_year_index(ds)]);
            let z = fitted.trend[i] + weekly + yearly.unwrap_or(0.0);
            rows.push(ForecastRow {
                ds,
                actual: fitted.observed[i],
                yhat: t.invert(z),
                yhat_lower: t.invert(z - INTERVAL_Z * fitted.resid_sd),
                yhat_upper: t.invert(z + INTERVAL_Z * fitted.resid_sd),
                trend: t.invert(fitted.trend[i]),
                weekly,
                yearly,
            });
        }

        if horizon > 0 {
            let forecast = run_backend(&fitted.values, horizon)?;
            for (j, &ds) in future.dates[n_hist..].iter().enumerate() {
                let point = forecast.point.get(j).copied().ok_or_else(|| {
                    ForecastError::Fit("backend returned fewer points than requested".to_string())
                })?;
                let (lower, upper) = forecast
                    .intervals
                    .as_ref()
                    .and_then(|iv| Some((*iv.lower.get(j)?, *iv.upper.get(j)?)))
                    .unwrap_or((
                        point - INTERVAL_Z * fitted.resid_sd,
                        point + INTERVAL_Z * fitted.resid_sd,
                    ));

                let weekly = fitted.weekly[weekday_index(ds)];
                let yearly = fitted
                    .yearly
                    .as_ref()
                    .map(|y| y[day_of_year_index(ds)]);
                let trend_z = point - weekly - yearly.unwrap_or(0.0);
                rows.push(ForecastRow {
                    ds,
                    actual: None,
                    yhat: t.invert(point),
                    yhat_lower: t.invert(lower),
                    yhat_upper: t.invert(upper),
                    trend: t.invert(trend_z),
                    weekly,
                    yearly,
                });
            }
        }

        Ok(ForecastTable { rows })
    }
}

// ---------------------------------------------------------------------------
// Statistical backend (augurs)
// ---------------------------------------------------------------------------

/// Forecast the transformed series with MSTL + AutoETS, falling back to a
/// non-seasonal AutoETS when the series is shorter than two weeks.
fn run_backend(values: &[f64], horizon: usize) -> Result<augurs::Forecast, ForecastError> {
    let transformers: Vec<Box<dyn Transformer>> = vec![Box::new(LinearInterpolator::default())];

    if values.len() >= MIN_SEASONAL_POINTS {
        let ets = AutoETS::non_seasonal().into_trend_model();
        let mstl = MSTLModel::new(vec![WEEKLY_PERIOD], ets);
        let mut forecaster = Forecaster::new(mstl).with_transformers(transformers);
        forecaster
            .fit(values)
            .map_err(|e| ForecastError::Fit(format!("seasonal model fit: {e}")))?;
        forecaster
            .predict(horizon, CONFIDENCE_LEVEL)
            .map_err(|e| ForecastError::Fit(format!("seasonal model predict: {e}")))
    } else {
        let ets = AutoETS::non_seasonal();
        let mut forecaster = Forecaster::new(ets).with_transformers(transformers);
        forecaster
            .fit(values)
            .map_err(|e| ForecastError::Fit(format!("trend model fit: {e}")))?;
        forecaster
            .predict(horizon, CONFIDENCE_LEVEL)
            .map_err(|e| ForecastError::Fit(format!("trend model predict: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Decomposition helpers
// ---------------------------------------------------------------------------

fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

fn day_of_year_index(date: NaiveDate) -> usize {
    date.ordinal0() as usize
}

/// Fill NaN runs by linear interpolation between the surrounding known
/// values. Leading or trailing NaNs take the nearest known value.
fn fill_gaps(values: &[f64]) -> Vec<f64> {
    let mut filled = values.to_vec();
    let known: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, _)| i)
        .collect();
    if known.is_empty() {
        return filled;
    }

    for i in 0..filled.len() {
        if filled[i].is_finite() {
            continue;
        }
        let prev = known.iter().rev().find(|&&k| k < i).copied();
        let next = known.iter().find(|&&k| k > i).copied();
        filled[i] = match (prev, next) {
            (Some(p), Some(n)) => {
                let frac = (i - p) as f64 / (n - p) as f64;
                values[p] + frac * (values[n] - values[p])
            }
            (Some(p), None) => values[p],
            (None, Some(n)) => values[n],
            (None, None) => 0.0,
        };
    }
    filled
}

/// Centered moving average with shrinking windows at the edges.
fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let half = window / 2;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(values.len());
            let slice = &values[lo..hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Mean detrended deviation per weekday (Monday-first).
fn weekday_means(dates: &[NaiveDate], detrended: &[f64]) -> [f64; 7] {
    let mut sums = [0.0f64; 7];
    let mut counts = [0usize; 7];
    for (date, value) in dates.iter().zip(detrended) {
        let idx = weekday_index(*date);
        sums[idx] += value;
        counts[idx] += 1;
    }
    let mut means = [0.0f64; 7];
    for idx in 0..7 {
        if counts[idx] > 0 {
            means[idx] = sums[idx] / counts[idx] as f64;
        }
    }
    means
}

/// Mean residual deviation per day of year (366 slots, empty slots zero).
fn day_of_year_means(dates: &[NaiveDate], residual: &[f64]) -> Vec<f64> {
    let mut sums = vec![0.0f64; 366];
    let mut counts = vec![0usize; 366];
    for (date, value) in dates.iter().zip(residual) {
        let idx = day_of_year_index(*date);
        sums[idx] += value;
        counts[idx] += 1;
    }
    sums.iter()
        .zip(&counts)
        .map(|(sum, &count)| if count > 0 { sum / count as f64 } else { 0.0 })
        .collect()
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
