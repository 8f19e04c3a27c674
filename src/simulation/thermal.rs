use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::error::EnvError;

/// Direction of the actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Remove heat (-1)
    Cool,
    /// Add heat (+1)
    Heat,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Cool => -1.0,
            Direction::Heat => 1.0,
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = EnvError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Direction::Cool),
            1 => Ok(Direction::Heat),
            other => Err(EnvError::InvalidDirection(other)),
        }
    }
}

/// Coefficients of the lumped server room model
///
/// The room settles at an intrinsic temperature that is a linear function of
/// the outside baseline and the load:
///
/// `T = base + k_ambient * T_ambient + k_users * users + k_rate * rate`
///
/// The actuator moves the temperature by `k_actuation` °C per unit of energy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalCoefficients {
    /// Temperature of an idle room at 0 °C outside (°C)
    pub base_temperature_c: f64,
    /// Share of the outside temperature reaching the room
    pub ambient_coefficient: f64,
    /// °C per active user
    pub user_coefficient: f64,
    /// °C per unit of data rate
    pub rate_coefficient: f64,
    /// °C moved per unit of actuation energy
    pub actuation_coefficient: f64,
}

impl Default for ThermalCoefficients {
    fn default() -> Self {
        Self {
            base_temperature_c: 16.0,
            ambient_coefficient: 0.25,
            user_coefficient: 0.05,
            rate_coefficient: 0.01,
            actuation_coefficient: 1.0,
        }
    }
}

impl ThermalCoefficients {
    /// Room temperature with no actuation
    pub fn intrinsic_temperature_c(&self, ambient_c: f64, number_users: u32, rate_data: f64) -> f64 {
        self.base_temperature_c
            + self.ambient_coefficient * ambient_c
            + self.user_coefficient * number_users as f64
            + self.rate_coefficient * rate_data
    }

    /// Temperature change produced by the actuator
    pub fn actuation_delta_c(&self, direction: Direction, energy: f64) -> f64 {
        direction.sign() * energy * self.actuation_coefficient
    }

    /// Energy a fixed-setpoint controller spends to cancel `drift_c`
    pub fn baseline_energy(&self, drift_c: f64) -> f64 {
        drift_c.abs() / self.actuation_coefficient
    }

    /// Energy needed to move the temperature by `correction_c` in either direction
    pub fn correction_energy(&self, correction_c: f64) -> f64 {
        correction_c.abs() / self.actuation_coefficient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_direction_from_sign() {
        assert_eq!(Direction::try_from(-1), Ok(Direction::Cool));
        assert_eq!(Direction::try_from(1), Ok(Direction::Heat));
        assert_eq!(Direction::try_from(0), Err(EnvError::InvalidDirection(0)));
        assert_eq!(Direction::from_str("cool").unwrap(), Direction::Cool);
        assert_eq!(Direction::Heat.to_string(), "heat");
    }

    #[test]
    fn test_intrinsic_temperature_rises_with_load() {
        let model = ThermalCoefficients::default();
        let quiet = model.intrinsic_temperature_c(10.0, 10, 20.0);
        let busy = model.intrinsic_temperature_c(10.0, 100, 300.0);

        assert!(busy > quiet);
        assert!((model.intrinsic_temperature_c(1.0, 20, 80.0) - 18.05).abs() < 1e-9);
    }

    #[test]
    fn test_actuation_follows_direction() {
        let model = ThermalCoefficients {
            actuation_coefficient: 0.5,
            ..Default::default()
        };

        assert_eq!(model.actuation_delta_c(Direction::Cool, 2.0), -1.0);
        assert_eq!(model.actuation_delta_c(Direction::Heat, 2.0), 1.0);
    }

    #[test]
    fn test_baseline_energy_is_symmetric() {
        let model = ThermalCoefficients {
            actuation_coefficient: 2.0,
            ..Default::default()
        };

        assert_eq!(model.baseline_energy(3.0), 1.5);
        assert_eq!(model.baseline_energy(-3.0), 1.5);
        assert_eq!(model.baseline_energy(0.0), 0.0);
    }
}
