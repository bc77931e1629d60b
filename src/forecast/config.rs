use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Configuration enums
// ---------------------------------------------------------------------------

/// Smallest selectable forecast horizon, in days.
pub const MIN_HORIZON: u32 = 1;
/// Largest selectable forecast horizon, in days.
pub const MAX_HORIZON: u32 = 366;
/// Initial horizon selection.
pub const DEFAULT_HORIZON: u32 = 90;
/// Slider step for the saturation bounds.
pub const BOUND_STEP: f64 = 0.05;

/// Whether seasonal effects are added to or multiplied with the trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonalityMode {
    Additive,
    Multiplicative,
}

impl fmt::Display for SeasonalityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonalityMode::Additive => write!(f, "additive"),
            SeasonalityMode::Multiplicative => write!(f, "multiplicative"),
        }
    }
}

/// Functional form of the trend: unbounded, or saturating between bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthModel {
    Linear,
    Logistic,
}

impl fmt::Display for GrowthModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthModel::Linear => write!(f, "linear"),
            GrowthModel::Logistic => write!(f, "logistic"),
        }
    }
}

/// Trend component toggles. Collected from the user but not consumed when
/// constructing the engine; see DESIGN.md.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrendComponents {
    pub weekly: bool,
    pub monthly: bool,
    pub yearly: bool,
}

/// Saturation bounds attached to the fit input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthSettings {
    pub cap: f64,
    pub floor: f64,
}

impl GrowthSettings {
    /// Sentinel bounds used on the linear path; attached to the data but
    /// ignored by the engine.
    pub const LINEAR: GrowthSettings = GrowthSettings {
        cap: 1.0,
        floor: 0.0,
    };
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A configuration the orchestrator must not run with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("cap must be higher than floor (cap={cap}, floor={floor})")]
    FloorAboveCap { cap: f64, floor: f64 },

    #[error("horizon must be between {MIN_HORIZON} and {MAX_HORIZON} days, got {0}")]
    HorizonOutOfRange(u32),
}

// ---------------------------------------------------------------------------
// Validated configuration bundle
// ---------------------------------------------------------------------------

/// The validated configuration handed to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub horizon: u32,
    pub seasonality: SeasonalityMode,
    pub components: TrendComponents,
    pub growth: GrowthModel,
    pub bounds: GrowthSettings,
}

impl ForecastConfig {
    /// Re-check the invariants before running. `floor > cap` under logistic
    /// growth must never reach the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_HORIZON..=MAX_HORIZON).contains(&self.horizon) {
            return Err(ConfigError::HorizonOutOfRange(self.horizon));
        }
        if self.growth == GrowthModel::Logistic && self.bounds.floor > self.bounds.cap {
            return Err(ConfigError::FloorAboveCap {
                cap: self.bounds.cap,
                floor: self.bounds.floor,
            });
        }
        Ok(())
    }

    /// A zero-width saturation band: allowed through with a warning, the
    /// engine degrades to an unbounded fit instead of crashing.
    pub fn degenerate_bounds(&self) -> bool {
        self.growth == GrowthModel::Logistic && self.bounds.floor == self.bounds.cap
    }
}

// ---------------------------------------------------------------------------
// Raw widget state → ForecastConfig
// ---------------------------------------------------------------------------

/// The parameter controls as the user left them, re-evaluated on every
/// interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlsState {
    pub horizon: u32,
    pub seasonality: SeasonalityMode,
    pub components: TrendComponents,
    pub growth: GrowthModel,
    /// Logistic cap slider position; meaningless under linear growth.
    pub cap: f64,
    /// Logistic floor slider position; meaningless under linear growth.
    pub floor: f64,
}

impl Default for ControlsState {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            seasonality: SeasonalityMode::Additive,
            components: TrendComponents::default(),
            growth: GrowthModel::Linear,
            cap: 0.0,
            floor: 0.0,
        }
    }
}

impl ControlsState {
    /// Resolve the saturation bounds for the selected growth model.
    ///
    /// Linear growth always yields the fixed sentinels, regardless of where
    /// the sliders were left while logistic was selected.
    pub fn growth_settings(&self) -> Result<GrowthSettings, ConfigError> {
        match self.growth {
            GrowthModel::Linear => Ok(GrowthSettings::LINEAR),
            GrowthModel::Logistic => {
                if self.floor > self.cap {
                    return Err(ConfigError::FloorAboveCap {
                        cap: self.cap,
                        floor: self.floor,
                    });
                }
                Ok(GrowthSettings {
                    cap: self.cap,
                    floor: self.floor,
                })
            }
        }
    }

    /// Build the validated configuration bundle.
    pub fn to_config(&self) -> Result<ForecastConfig, ConfigError> {
        if !(MIN_HORIZON..=MAX_HORIZON).contains(&self.horizon) {
            return Err(ConfigError::HorizonOutOfRange(self.horizon));
        }
        let bounds = self.growth_settings()?;
        Ok(ForecastConfig {
            horizon: self.horizon,
            seasonality: self.seasonality,
            components: self.components,
            growth: self.growth,
            bounds,
        })
    }

    /// The non-blocking warning for equal bounds. The run proceeds.
    pub fn warning(&self) -> Option<String> {
        (self.growth == GrowthModel::Logistic && self.floor == self.cap)
            .then(|| "Cap must be higher than floor.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_input_surface() {
        let controls = ControlsState::default();
        assert_eq!(controls.horizon, 90);
        assert_eq!(controls.seasonality, SeasonalityMode::Additive);
        assert_eq!(controls.growth, GrowthModel::Linear);
        assert_eq!(controls.cap, 0.0);
        assert_eq!(controls.floor, 0.0);
        assert!(!controls.components.weekly);
    }

    #[test]
    fn linear_growth_pins_the_sentinel_bounds() {
        // Sliders left in a logistic position must not leak into linear mode.
        let controls = ControlsState {
            growth: GrowthModel::Linear,
            cap: 0.35,
            floor: 0.15,
            ..ControlsState::default()
        };

        let bounds = controls.growth_settings().unwrap();
        assert_eq!(bounds, GrowthSettings { cap: 1.0, floor: 0.0 });
    }

    #[test]
    fn logistic_growth_uses_the_slider_bounds() {
        let controls = ControlsState {
            growth: GrowthModel::Logistic,
            cap: 0.8,
            floor: 0.2,
            ..ControlsState::default()
        };

        let config = controls.to_config().unwrap();
        assert_eq!(config.bounds, GrowthSettings { cap: 0.8, floor: 0.2 });
        assert!(config.validate().is_ok());
        assert!(!config.degenerate_bounds());
    }

    #[test]
    fn floor_above_cap_blocks() {
        let controls = ControlsState {
            growth: GrowthModel::Logistic,
            cap: 0.3,
            floor: 0.5,
            ..ControlsState::default()
        };

        let err = controls.to_config().unwrap_err();
        assert_eq!(
            err,
            ConfigError::FloorAboveCap {
                cap: 0.3,
                floor: 0.5
            }
        );
    }

    #[test]
    fn equal_bounds_warn_but_proceed() {
        let controls = ControlsState {
            growth: GrowthModel::Logistic,
            cap: 0.4,
            floor: 0.4,
            ..ControlsState::default()
        };

        assert!(controls.warning().is_some());
        let config = controls.to_config().unwrap();
        assert!(config.degenerate_bounds());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn linear_growth_never_warns() {
        let controls = ControlsState {
            growth: GrowthModel::Linear,
            cap: 0.4,
            floor: 0.4,
            ..ControlsState::default()
        };
        assert!(controls.warning().is_none());
    }

    #[test]
    fn horizon_bounds_are_inclusive() {
        for horizon in [MIN_HORIZON, DEFAULT_HORIZON, MAX_HORIZON] {
            let controls = ControlsState {
                horizon,
                ..ControlsState::default()
            };
            assert!(controls.to_config().is_ok());
        }
        for horizon in [0, MAX_HORIZON + 1] {
            let controls = ControlsState {
                horizon,
                ..ControlsState::default()
            };
            assert_eq!(
                controls.to_config().unwrap_err(),
                ConfigError::HorizonOutOfRange(horizon)
            );
        }
    }
}
