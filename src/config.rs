use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ScheduleError};

/// largest scale a `rust_decimal::Decimal` can carry
const MAX_SCALE: u32 = 28;

/// rounding applied to every currency amount and intermediate rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoundingMode {
    /// midpoint rounds away from zero (0.125 -> 0.13)
    #[default]
    HalfUp,
    /// midpoint rounds to the even neighbour (0.125 -> 0.12)
    HalfEven,
    /// truncate toward zero
    Down,
}

impl RoundingMode {
    pub fn strategy(&self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::Down => RoundingStrategy::ToZero,
        }
    }
}

/// engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// decimal places kept on currency amounts
    pub currency_scale: u32,
    /// decimal places kept on the monthly periodic rate
    pub rate_scale: u32,
    pub rounding: RoundingMode,
    /// nominal length of one period, stamped on every installment
    pub period_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency_scale: 2,
            rate_scale: 10,
            rounding: RoundingMode::HalfUp,
            period_days: 30,
        }
    }
}

impl EngineConfig {
    /// parse and validate a json configuration; missing keys take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_scales(mut self, currency_scale: u32, rate_scale: u32) -> Self {
        self.currency_scale = currency_scale;
        self.rate_scale = rate_scale;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate_scale > MAX_SCALE {
            return Err(ScheduleError::InvalidConfiguration {
                message: format!("rate scale {} exceeds {}", self.rate_scale, MAX_SCALE),
            });
        }
        if self.currency_scale > self.rate_scale {
            return Err(ScheduleError::InvalidConfiguration {
                message: format!(
                    "currency scale {} is finer than rate scale {}",
                    self.currency_scale, self.rate_scale
                ),
            });
        }
        if self.period_days == 0 {
            return Err(ScheduleError::InvalidConfiguration {
                message: "period length must be at least one day".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.currency_scale, 2);
        assert_eq!(config.rate_scale, 10);
        assert_eq!(config.rounding, RoundingMode::HalfUp);
        assert_eq!(config.period_days, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = EngineConfig::from_json(r#"{"rounding": "HalfEven"}"#).unwrap();
        assert_eq!(config.rounding, RoundingMode::HalfEven);
        assert_eq!(config.currency_scale, 2);
        assert_eq!(config.rate_scale, 10);
    }

    #[test]
    fn test_invalid_scales_rejected() {
        let err = EngineConfig::default().with_scales(4, 2).validate().unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidConfiguration { .. }));

        let err = EngineConfig::from_json(r#"{"rate_scale": 40}"#).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = EngineConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ScheduleError::Serialization(_)));
    }
}
