//! Static tuning table for the economy.

use crate::stage::{Stage, StageTable};
use serde::{Deserialize, Serialize};

/// Economy tuning parameters.
///
/// Plain data; every field has a default so partial override files
/// deserialize cleanly. The rate calculator clamps degenerate values on its
/// own, so tests may construct extreme tables without going through
/// [`validate_config`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconConfig {
    /// Units per second moved by one worker at facility level 0.
    pub base_rate: StageTable<f64>,
    /// Cost of the second worker on each stage.
    pub hire_base_cost: StageTable<f64>,
    /// Geometric growth of the hire cost per additional worker.
    pub hire_growth: f64,
    /// Cost of the first facility level on each stage.
    pub facility_base_cost: StageTable<f64>,
    /// Geometric growth of the facility cost per level.
    pub facility_growth: f64,
    /// Flat throughput bonus per facility level (0.18 = +18%).
    pub facility_bonus_per_level: f64,
    /// Currency earned per settled unit at brand level 0.
    pub base_sell_price: f64,
    pub brand_base_cost: f64,
    pub brand_growth: f64,
    /// Flat sell-price bonus per brand level.
    pub brand_bonus_per_level: f64,
    /// Dough added to the first buffer per manual click.
    pub click_gain: f64,
    /// Currency of a freshly created state.
    pub starting_currency: f64,
    /// Longest offline gap that is replayed, in milliseconds.
    pub offline_cap_ms: u64,
    /// Sub-step used when replaying offline time, in seconds.
    pub offline_step_secs: f64,
    /// Live simulation step, in seconds.
    pub fixed_step_secs: f64,
    /// Longest frame delta fed to the live accumulator, in milliseconds.
    pub max_frame_ms: f64,
    /// Interval between automatic saves, in milliseconds.
    pub autosave_interval_ms: u64,
}

impl Default for EconConfig {
    fn default() -> Self {
        Self {
            base_rate: StageTable {
                dough: 1.35,
                steam: 0.94,
                pack: 0.82,
                dispatch: 0.72,
            },
            hire_base_cost: StageTable {
                dough: 22.0,
                steam: 44.0,
                pack: 58.0,
                dispatch: 78.0,
            },
            hire_growth: 1.28,
            facility_base_cost: StageTable {
                dough: 64.0,
                steam: 98.0,
                pack: 128.0,
                dispatch: 170.0,
            },
            facility_growth: 1.46,
            facility_bonus_per_level: 0.18,
            base_sell_price: 6.0,
            brand_base_cost: 230.0,
            brand_growth: 1.65,
            brand_bonus_per_level: 0.2,
            click_gain: 1.0,
            starting_currency: 30.0,
            offline_cap_ms: 8 * 60 * 60 * 1000,
            offline_step_secs: 1.0,
            fixed_step_secs: 0.1,
            max_frame_ms: 1000.0,
            autosave_interval_ms: 5_000,
        }
    }
}

/// Validation errors for tuning tables and economy state.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    /// Numeric field must be finite.
    #[error("non-finite value in `{0}`")]
    NonFinite(&'static str),
    /// Field must be >= 0.
    #[error("negative value in `{0}`")]
    Negative(&'static str),
    /// Field must be > 0.
    #[error("`{0}` must be strictly positive")]
    NonPositive(&'static str),
    /// Cost growth must exceed 1 so prices keep rising.
    #[error("growth factor `{0}` must be > 1")]
    GrowthTooSmall(&'static str),
    /// A stage has no workers.
    #[error("stage {0} has zero workers")]
    NoWorkers(Stage),
}

fn check_non_negative(field: &'static str, v: f64) -> Result<(), ValidationError> {
    if !v.is_finite() {
        return Err(ValidationError::NonFinite(field));
    }
    if v < 0.0 {
        return Err(ValidationError::Negative(field));
    }
    Ok(())
}

fn check_positive(field: &'static str, v: f64) -> Result<(), ValidationError> {
    check_non_negative(field, v)?;
    if v == 0.0 {
        return Err(ValidationError::NonPositive(field));
    }
    Ok(())
}

fn check_growth(field: &'static str, v: f64) -> Result<(), ValidationError> {
    if !v.is_finite() {
        return Err(ValidationError::NonFinite(field));
    }
    if v <= 1.0 {
        return Err(ValidationError::GrowthTooSmall(field));
    }
    Ok(())
}

/// Validate a tuning table loaded from an untrusted source.
pub fn validate_config(c: &EconConfig) -> Result<(), ValidationError> {
    for (_, &rate) in c.base_rate.iter() {
        check_non_negative("base_rate", rate)?;
    }
    for (_, &cost) in c.hire_base_cost.iter() {
        check_positive("hire_base_cost", cost)?;
    }
    for (_, &cost) in c.facility_base_cost.iter() {
        check_positive("facility_base_cost", cost)?;
    }
    check_growth("hire_growth", c.hire_growth)?;
    check_growth("facility_growth", c.facility_growth)?;
    check_growth("brand_growth", c.brand_growth)?;
    check_non_negative("facility_bonus_per_level", c.facility_bonus_per_level)?;
    check_non_negative("brand_bonus_per_level", c.brand_bonus_per_level)?;
    check_non_negative("base_sell_price", c.base_sell_price)?;
    check_positive("brand_base_cost", c.brand_base_cost)?;
    check_non_negative("click_gain", c.click_gain)?;
    check_non_negative("starting_currency", c.starting_currency)?;
    check_positive("offline_step_secs", c.offline_step_secs)?;
    check_positive("fixed_step_secs", c.fixed_step_secs)?;
    check_positive("max_frame_ms", c.max_frame_ms)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        validate_config(&EconConfig::default()).unwrap();
    }

    #[test]
    fn default_cap_is_eight_hours() {
        assert_eq!(EconConfig::default().offline_cap_ms, 28_800_000);
    }

    #[test]
    fn rejects_degenerate_values() {
        let mut c = EconConfig::default();
        c.base_rate[Stage::Pack] = f64::NAN;
        assert_eq!(validate_config(&c), Err(ValidationError::NonFinite("base_rate")));

        let mut c = EconConfig::default();
        c.hire_growth = 1.0;
        assert_eq!(
            validate_config(&c),
            Err(ValidationError::GrowthTooSmall("hire_growth"))
        );

        let mut c = EconConfig::default();
        c.brand_base_cost = 0.0;
        assert_eq!(
            validate_config(&c),
            Err(ValidationError::NonPositive("brand_base_cost"))
        );

        let mut c = EconConfig::default();
        c.click_gain = -1.0;
        assert_eq!(validate_config(&c), Err(ValidationError::Negative("click_gain")));
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let c: EconConfig =
            serde_json::from_str(r#"{"hire_growth": 1.5, "click_gain": 3}"#).unwrap();
        assert_eq!(c.hire_growth, 1.5);
        assert_eq!(c.click_gain, 3.0);
        assert_eq!(c.base_rate, EconConfig::default().base_rate);
        assert_eq!(c.brand_growth, EconConfig::default().brand_growth);
    }
}
