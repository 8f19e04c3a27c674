//! # Calendar
//!
//! Month index and the seasonal ambient temperature profile that drives the
//! outside contribution to the server room temperature.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::EnvError;

/// Default monthly ambient baseline in °C, January first
pub const DEFAULT_MONTHLY_TEMPERATURES_C: [f64; 12] =
    [1.0, 5.0, 7.0, 10.0, 11.0, 20.0, 23.0, 24.0, 22.0, 10.0, 5.0, 1.0];

/// Zero-based month index (0 = January, 11 = December)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Month(u8);

impl Month {
    pub const JANUARY: Month = Month(0);

    /// Build a month from a zero-based index, rejecting anything outside 0..=11
    pub fn new(index: i64) -> Result<Self, EnvError> {
        if (0..12).contains(&index) {
            Ok(Self(index as u8))
        } else {
            Err(EnvError::InvalidMonth(index))
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Following month, wrapping December to January
    pub fn next(self) -> Self {
        Self((self.0 + 1) % 12)
    }

    /// Month reached after `months` steps forward
    pub fn advance(self, months: u64) -> Self {
        Self(((self.0 as u64 + months) % 12) as u8)
    }

    pub fn name(self) -> &'static str {
        chrono::Month::try_from(self.0 + 1)
            .map(|m| m.name())
            .unwrap_or("Unknown")
    }
}

impl Default for Month {
    fn default() -> Self {
        Month::JANUARY
    }
}

impl TryFrom<i64> for Month {
    type Error = EnvError;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        Month::new(index)
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> Self {
        month.0
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ambient temperature lookup, one value per month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProfile {
    pub monthly_temperatures_c: [f64; 12],
}

impl Default for SeasonalProfile {
    fn default() -> Self {
        Self {
            monthly_temperatures_c: DEFAULT_MONTHLY_TEMPERATURES_C,
        }
    }
}

impl SeasonalProfile {
    pub fn new(monthly_temperatures_c: [f64; 12]) -> Self {
        Self {
            monthly_temperatures_c,
        }
    }

    /// Ambient baseline for a month
    pub fn temperature_c(&self, month: Month) -> f64 {
        self.monthly_temperatures_c[month.index()]
    }

    pub fn is_finite(&self) -> bool {
        self.monthly_temperatures_c.iter().all(|t| t.is_finite())
    }
}
