//! # Cooling Environment
//!
//! The server room state machine. Owns the calendar, the load walk, the
//! thermal model and the energy ledger, and advances them one step per
//! control action.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info, warn};
use validator::Validate;

use super::calendar::{Month, SeasonalProfile, DEFAULT_MONTHLY_TEMPERATURES_C};
use super::error::EnvError;
use super::load::{LoadState, ServerLoad, WalkBounds};
use super::thermal::{Direction, ThermalCoefficients};

/// How a safety breach is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EpisodeMode {
    /// A breach ends the episode
    #[default]
    Training,
    /// A breach is corrected back to the optimal band and billed as extra energy
    Evaluation,
}

/// Environment configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Optimal band `[low, high]` in °C
    pub optimal_temperature: [f64; 2],
    /// Month used at construction
    pub initial_month: Month,
    pub initial_number_users: u32,
    #[validate(range(min = 0.0))]
    pub initial_rate_data: f64,

    pub min_number_users: u32,
    pub max_number_users: u32,
    /// Largest change of the user count per step
    pub max_update_users: u32,
    #[validate(range(min = 0.0))]
    pub min_rate_data: f64,
    #[validate(range(min = 0.0))]
    pub max_rate_data: f64,
    /// Largest change of the data rate per step
    pub max_update_data: u32,

    /// Ambient baseline per month in °C, January first
    pub monthly_temperatures_c: [f64; 12],
    pub thermal: ThermalCoefficients,

    /// Width of the tolerated band on each side of the optimal band (°C)
    #[validate(range(min = 0.0))]
    pub safety_margin_c: f64,
    /// Multiplier applied to the per-step energy saving
    #[validate(range(min = 0.0))]
    pub reward_scale: f64,
    /// Subtracted from the reward of the step that breaches the safety band
    #[validate(range(min = 0.0))]
    pub termination_penalty: f64,

    pub mode: EpisodeMode,
    /// Random seed for reproducibility (None = random)
    pub random_seed: Option<u64>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            optimal_temperature: [18.0, 24.0],
            initial_month: Month::JANUARY,
            initial_number_users: 10,
            initial_rate_data: 60.0,
            min_number_users: 10,
            max_number_users: 100,
            max_update_users: 5,
            min_rate_data: 20.0,
            max_rate_data: 300.0,
            max_update_data: 10,
            monthly_temperatures_c: DEFAULT_MONTHLY_TEMPERATURES_C,
            thermal: ThermalCoefficients::default(),
            safety_margin_c: 10.0,
            reward_scale: 1e-3,
            termination_penalty: 0.0,
            mode: EpisodeMode::Training,
            random_seed: None,
        }
    }
}

impl EnvironmentConfig {
    /// Configuration with the given band and starting conditions, defaults elsewhere
    pub fn with_initial_conditions(
        optimal_temperature: [f64; 2],
        initial_month: i64,
        initial_number_users: u32,
        initial_rate_data: f64,
    ) -> Result<Self, EnvError> {
        Ok(Self {
            optimal_temperature,
            initial_month: Month::new(initial_month)?,
            initial_number_users,
            initial_rate_data,
            ..Default::default()
        })
    }

    /// Set random seed
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_mode(mut self, mode: EpisodeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_safety_margin(mut self, margin_c: f64) -> Self {
        self.safety_margin_c = margin_c;
        self
    }

    pub fn with_thermal(mut self, thermal: ThermalCoefficients) -> Self {
        self.thermal = thermal;
        self
    }

    /// Safety interval surrounding the optimal band
    pub fn safety_bounds(&self) -> (f64, f64) {
        let [low, high] = self.optimal_temperature;
        (low - self.safety_margin_c, high + self.safety_margin_c)
    }

    fn user_bounds(&self) -> WalkBounds {
        WalkBounds::new(
            self.min_number_users as f64,
            self.max_number_users as f64,
            self.max_update_users,
        )
    }

    fn rate_bounds(&self) -> WalkBounds {
        WalkBounds::new(self.min_rate_data, self.max_rate_data, self.max_update_data)
    }

    /// Structural checks on top of the per-field ranges
    fn check(&self) -> Result<(), EnvError> {
        self.validate()?;
        if !self.initial_rate_data.is_finite() {
            return Err(EnvError::Validation(format!(
                "initial_rate_data must be finite, got {}",
                self.initial_rate_data
            )));
        }

        let [low, high] = self.optimal_temperature;
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(EnvError::Configuration(format!(
                "optimal temperature band must satisfy low < high, got [{low}, {high}]"
            )));
        }
        if self.min_number_users >= self.max_number_users {
            return Err(EnvError::Configuration(format!(
                "user bounds must satisfy min < max, got [{}, {}]",
                self.min_number_users, self.max_number_users
            )));
        }
        if !self.min_rate_data.is_finite()
            || !self.max_rate_data.is_finite()
            || self.min_rate_data >= self.max_rate_data
        {
            return Err(EnvError::Configuration(format!(
                "data rate bounds must satisfy min < max, got [{}, {}]",
                self.min_rate_data, self.max_rate_data
            )));
        }
        if !SeasonalProfile::new(self.monthly_temperatures_c).is_finite() {
            return Err(EnvError::Configuration(
                "monthly temperatures must be finite".to_string(),
            ));
        }

        let t = &self.thermal;
        let coefficients = [
            t.base_temperature_c,
            t.ambient_coefficient,
            t.user_coefficient,
            t.rate_coefficient,
        ];
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(EnvError::Configuration(
                "thermal coefficients must be finite".to_string(),
            ));
        }
        if !t.actuation_coefficient.is_finite() || t.actuation_coefficient <= 0.0 {
            return Err(EnvError::Configuration(format!(
                "actuation coefficient must be positive, got {}",
                t.actuation_coefficient
            )));
        }
        if !self.safety_margin_c.is_finite() {
            return Err(EnvError::Configuration(
                "safety margin must be finite".to_string(),
            ));
        }
        if !self.reward_scale.is_finite() || !self.termination_penalty.is_finite() {
            return Err(EnvError::Configuration(format!(
                "reward scale and termination penalty must be finite, got {} and {}",
                self.reward_scale, self.termination_penalty
            )));
        }

        Ok(())
    }
}

/// Normalized observation handed to the policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Controlled temperature scaled over the safety interval (0 = lower edge, 1 = upper edge)
    pub temperature: f64,
    /// User count scaled over its bounds
    pub number_users: f64,
    /// Data rate scaled over its bounds
    pub rate_data: f64,
}

impl Observation {
    pub fn as_array(&self) -> [f64; 3] {
        [self.temperature, self.number_users, self.rate_data]
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.as_array().to_vec()
    }
}

/// Observation, reward and termination flag
pub type StepOutcome = (Observation, f64, bool);

/// Complete environment state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    pub month: Month,
    pub atmospheric_temperature: f64,
    pub intrinsic_temperature: f64,
    pub temperature_ai: f64,
    pub temperature_noai: f64,
    pub current_number_users: u32,
    pub current_rate_data: f64,
    pub total_energy_ai: f64,
    pub total_energy_noai: f64,
    pub reward: f64,
    pub done: bool,
    pub steps: u64,
}

/// Server room cooling environment
///
/// Lifecycle: `observe` / `update_env` until `done`, then `reset`.
/// Stepping a terminated episode returns [`EnvError::EpisodeTerminated`].
#[derive(Debug, Clone)]
pub struct Environment {
    config: EnvironmentConfig,
    profile: SeasonalProfile,
    load: ServerLoad,
    seed: u64,
    rng: StdRng,
    month: Month,
    atmospheric_temperature: f64,
    intrinsic_temperature: f64,
    temperature_ai: f64,
    total_energy_ai: f64,
    total_energy_noai: f64,
    reward: f64,
    done: bool,
    steps: u64,
    mode: EpisodeMode,
}

impl Environment {
    /// Create a new environment, rejecting invalid configurations
    pub fn new(config: EnvironmentConfig) -> Result<Self, EnvError> {
        config.check()?;

        let users = config.user_bounds();
        let rate = config.rate_bounds();
        if !users.contains(config.initial_number_users as f64) {
            warn!(
                initial_number_users = config.initial_number_users,
                min = users.min,
                max = users.max,
                "initial user count outside bounds, clipping"
            );
        }
        if !rate.contains(config.initial_rate_data) {
            warn!(
                initial_rate_data = config.initial_rate_data,
                min = rate.min,
                max = rate.max,
                "initial data rate outside bounds, clipping"
            );
        }

        let load = ServerLoad::new(
            users,
            rate,
            config.initial_number_users,
            config.initial_rate_data,
        );
        let seed = config.random_seed.unwrap_or_else(rand::random);
        let profile = SeasonalProfile::new(config.monthly_temperatures_c);
        let month = config.initial_month;
        let atmospheric_temperature = profile.temperature_c(month);
        let initial_load = load.state();
        let intrinsic_temperature = config.thermal.intrinsic_temperature_c(
            atmospheric_temperature,
            initial_load.number_users,
            initial_load.rate_data,
        );

        let (safe_low, safe_high) = config.safety_bounds();
        if !(safe_low..=safe_high).contains(&intrinsic_temperature) {
            return Err(EnvError::Configuration(format!(
                "initial temperature {intrinsic_temperature:.2}°C lies outside the safety interval [{safe_low}, {safe_high}]"
            )));
        }

        info!(
            seed,
            month = %month,
            temperature_c = intrinsic_temperature,
            band_low = config.optimal_temperature[0],
            band_high = config.optimal_temperature[1],
            "cooling environment created"
        );

        Ok(Self {
            mode: config.mode,
            profile,
            load,
            seed,
            rng: StdRng::seed_from_u64(seed),
            month,
            atmospheric_temperature,
            intrinsic_temperature,
            temperature_ai: intrinsic_temperature,
            total_energy_ai: 0.0,
            total_energy_noai: 0.0,
            reward: 0.0,
            done: false,
            steps: 0,
            config,
        })
    }

    /// Create an environment with default model constants
    pub fn with_initial_conditions(
        optimal_temperature: [f64; 2],
        initial_month: i64,
        initial_number_users: u32,
        initial_rate_data: f64,
    ) -> Result<Self, EnvError> {
        Self::new(EnvironmentConfig::with_initial_conditions(
            optimal_temperature,
            initial_month,
            initial_number_users,
            initial_rate_data,
        )?)
    }

    /// Current observation, last reward and termination flag
    pub fn observe(&self) -> StepOutcome {
        (self.observation(), self.reward, self.done)
    }

    /// Apply one control action and advance the simulation by one step
    ///
    /// # Arguments
    /// * `direction` - Cool (-1) or heat (+1)
    /// * `energy_ai` - Actuation energy, finite and non-negative
    /// * `month` - Calendar month for this step's ambient baseline (0..=11)
    pub fn update_env(
        &mut self,
        direction: Direction,
        energy_ai: f64,
        month: i64,
    ) -> Result<StepOutcome, EnvError> {
        if self.done {
            warn!(steps = self.steps, "update_env called on a terminated episode");
            return Err(EnvError::EpisodeTerminated);
        }
        if !energy_ai.is_finite() || energy_ai < 0.0 {
            return Err(EnvError::InvalidEnergy(energy_ai));
        }
        let month = Month::new(month)?;
        let thermal = self.config.thermal;

        let atmospheric_temperature = self.profile.temperature_c(month);

        let mut rng = self.rng.clone();
        let mut load = self.load.clone();
        let LoadState {
            number_users,
            rate_data,
        } = load.step(&mut rng);

        let intrinsic_temperature =
            thermal.intrinsic_temperature_c(atmospheric_temperature, number_users, rate_data);
        let drift = intrinsic_temperature - self.intrinsic_temperature;

        let mut temperature_ai =
            self.temperature_ai + drift + thermal.actuation_delta_c(direction, energy_ai);
        let mut energy_ai_step = energy_ai;
        let energy_noai_step = thermal.baseline_energy(drift);

        let (safe_low, safe_high) = self.config.safety_bounds();
        let breached = temperature_ai < safe_low || temperature_ai > safe_high;
        let done = breached && self.mode == EpisodeMode::Training;

        if breached && self.mode == EpisodeMode::Evaluation {
            let [low, high] = self.config.optimal_temperature;
            let target = if temperature_ai < safe_low { low } else { high };
            warn!(
                temperature_c = temperature_ai,
                corrected_c = target,
                "safety band breached, correcting"
            );
            energy_ai_step += thermal.correction_energy(target - temperature_ai);
            temperature_ai = target;
        }

        let mut reward = self.config.reward_scale * (energy_noai_step - energy_ai_step);
        if done {
            reward -= self.config.termination_penalty;
        }

        let total_energy_ai = self.total_energy_ai + energy_ai_step;
        let total_energy_noai = self.total_energy_noai + energy_noai_step;

        if ![temperature_ai, total_energy_ai, total_energy_noai, reward]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(EnvError::Computation(format!(
                "non-finite result (temperature={temperature_ai}, energy_ai={total_energy_ai}, \
                 energy_noai={total_energy_noai}, reward={reward})"
            )));
        }

        self.rng = rng;
        self.load = load;
        self.month = month;
        self.atmospheric_temperature = atmospheric_temperature;
        self.intrinsic_temperature = intrinsic_temperature;
        self.temperature_ai = temperature_ai;
        self.total_energy_ai = total_energy_ai;
        self.total_energy_noai = total_energy_noai;
        self.reward = reward;
        self.done = done;
        self.steps += 1;

        debug!(
            step = self.steps,
            month = %month,
            %direction,
            energy_ai,
            users = number_users,
            rate = rate_data,
            drift_c = drift,
            temperature_c = temperature_ai,
            reward,
            done,
            "environment step"
        );

        if done {
            info!(
                steps = self.steps,
                temperature_c = temperature_ai,
                safe_low,
                safe_high,
                "temperature left the safety interval, episode terminated"
            );
        }

        Ok(self.observe())
    }

    /// Start a fresh episode from the construction-time load, seasoned for `month`
    ///
    /// The random stream continues where it left off.
    pub fn reset(&mut self, month: i64) -> Result<(), EnvError> {
        let month = Month::new(month)?;
        let mut load = self.load.clone();
        load.restore(self.config.initial_number_users, self.config.initial_rate_data);

        let atmospheric_temperature = self.profile.temperature_c(month);
        let LoadState {
            number_users,
            rate_data,
        } = load.state();
        let intrinsic_temperature = self.config.thermal.intrinsic_temperature_c(
            atmospheric_temperature,
            number_users,
            rate_data,
        );

        let (safe_low, safe_high) = self.config.safety_bounds();
        if !(safe_low..=safe_high).contains(&intrinsic_temperature) {
            return Err(EnvError::Configuration(format!(
                "temperature {intrinsic_temperature:.2}°C for {month} lies outside the safety interval [{safe_low}, {safe_high}]"
            )));
        }

        self.load = load;
        self.month = month;
        self.atmospheric_temperature = atmospheric_temperature;
        self.intrinsic_temperature = intrinsic_temperature;
        self.temperature_ai = intrinsic_temperature;
        self.total_energy_ai = 0.0;
        self.total_energy_noai = 0.0;
        self.reward = 0.0;
        self.done = false;
        self.steps = 0;

        info!(month = %month, temperature_c = intrinsic_temperature, "environment reset");
        Ok(())
    }

    /// Reset and re-seed the random stream, replaying the same load noise
    pub fn reset_with_seed(&mut self, month: i64, seed: u64) -> Result<(), EnvError> {
        self.reset(month)?;
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
        Ok(())
    }

    fn observation(&self) -> Observation {
        let (safe_low, safe_high) = self.config.safety_bounds();
        let (number_users, rate_data) = self.load.normalized();

        Observation {
            temperature: (self.temperature_ai - safe_low) / (safe_high - safe_low),
            number_users,
            rate_data,
        }
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn atmospheric_temperature(&self) -> f64 {
        self.atmospheric_temperature
    }

    pub fn temperature_ai(&self) -> f64 {
        self.temperature_ai
    }

    /// Setpoint held by the fixed baseline controller: the middle of the optimal band
    pub fn temperature_noai(&self) -> f64 {
        let [low, high] = self.config.optimal_temperature;
        (low + high) / 2.0
    }

    pub fn current_number_users(&self) -> u32 {
        self.load.number_users()
    }

    pub fn current_rate_data(&self) -> f64 {
        self.load.rate_data()
    }

    pub fn total_energy_ai(&self) -> f64 {
        self.total_energy_ai
    }

    pub fn total_energy_noai(&self) -> f64 {
        self.total_energy_noai
    }

    /// Baseline energy minus controlled energy for the current episode
    pub fn energy_saved(&self) -> f64 {
        self.total_energy_noai - self.total_energy_ai
    }

    pub fn optimal_temperature(&self) -> [f64; 2] {
        self.config.optimal_temperature
    }

    pub fn safety_bounds(&self) -> (f64, f64) {
        self.config.safety_bounds()
    }

    /// Whether the controlled temperature is inside the optimal band
    pub fn in_optimal_band(&self) -> bool {
        let [low, high] = self.config.optimal_temperature;
        (low..=high).contains(&self.temperature_ai)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn mode(&self) -> EpisodeMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EpisodeMode) {
        self.mode = mode;
    }

    /// Get current complete environment state
    pub fn state(&self) -> EnvironmentState {
        EnvironmentState {
            month: self.month,
            atmospheric_temperature: self.atmospheric_temperature,
            intrinsic_temperature: self.intrinsic_temperature,
            temperature_ai: self.temperature_ai,
            temperature_noai: self.temperature_noai(),
            current_number_users: self.current_number_users(),
            current_rate_data: self.current_rate_data(),
            total_energy_ai: self.total_energy_ai,
            total_energy_noai: self.total_energy_noai,
            reward: self.reward,
            done: self.done,
            steps: self.steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn seeded(seed: u64) -> Environment {
        let config = EnvironmentConfig::with_initial_conditions([18.0, 24.0], 0, 20, 80.0)
            .unwrap()
            .with_random_seed(seed);
        Environment::new(config).unwrap()
    }

    #[test]
    fn test_environment_initialization() {
        let env = seeded(42);

        assert_eq!(env.atmospheric_temperature(), 1.0);
        assert_eq!(env.current_number_users(), 20);
        assert_eq!(env.current_rate_data(), 80.0);
        assert!((env.temperature_ai() - 18.05).abs() < 1e-9);
        assert_eq!(env.total_energy_ai(), 0.0);
        assert_eq!(env.total_energy_noai(), 0.0);
        assert_eq!(env.temperature_noai(), 21.0);

        let (obs, reward, done) = env.observe();
        assert_eq!(reward, 0.0);
        assert!(!done);
        assert!(obs.temperature > 0.0 && obs.temperature < 1.0);
    }

    #[rstest]
    #[case([24.0, 18.0])]
    #[case([20.0, 20.0])]
    #[case([f64::NAN, 24.0])]
    fn test_invalid_band_rejected(#[case] band: [f64; 2]) {
        let result = Environment::with_initial_conditions(band, 0, 20, 80.0);
        assert!(matches!(result, Err(EnvError::Configuration(_))));
    }

    #[test]
    fn test_invalid_initial_month_rejected() {
        let result = Environment::with_initial_conditions([18.0, 24.0], 12, 20, 80.0);
        assert_eq!(result.unwrap_err(), EnvError::InvalidMonth(12));
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_invalid_initial_rate_rejected(#[case] rate: f64) {
        let result = Environment::with_initial_conditions([18.0, 24.0], 0, 20, rate);
        assert!(matches!(result, Err(EnvError::Validation(_))));
    }

    #[rstest]
    #[case::min_rate_nan(|c: &mut EnvironmentConfig| c.min_rate_data = f64::NAN)]
    #[case::min_rate_infinite(|c: &mut EnvironmentConfig| c.min_rate_data = f64::INFINITY)]
    #[case::max_rate_infinite(|c: &mut EnvironmentConfig| c.max_rate_data = f64::INFINITY)]
    #[case::reward_scale_infinite(|c: &mut EnvironmentConfig| c.reward_scale = f64::INFINITY)]
    #[case::reward_scale_nan(|c: &mut EnvironmentConfig| c.reward_scale = f64::NAN)]
    #[case::penalty_infinite(|c: &mut EnvironmentConfig| c.termination_penalty = f64::INFINITY)]
    #[case::penalty_nan(|c: &mut EnvironmentConfig| c.termination_penalty = f64::NAN)]
    fn test_non_finite_constants_rejected(#[case] corrupt: fn(&mut EnvironmentConfig)) {
        let mut config = EnvironmentConfig::default().with_random_seed(1);
        corrupt(&mut config);

        assert!(matches!(
            Environment::new(config),
            Err(EnvError::Configuration(_))
        ));
    }

    #[test]
    fn test_non_positive_actuation_rejected() {
        let config = EnvironmentConfig::default().with_thermal(ThermalCoefficients {
            actuation_coefficient: 0.0,
            ..Default::default()
        });
        assert!(matches!(
            Environment::new(config),
            Err(EnvError::Configuration(_))
        ));
    }

    #[test]
    fn test_initial_temperature_outside_safety_rejected() {
        let config =
            EnvironmentConfig::with_initial_conditions([60.0, 70.0], 0, 20, 80.0).unwrap();
        assert!(matches!(
            Environment::new(config),
            Err(EnvError::Configuration(_))
        ));
    }

    #[test]
    fn test_initial_users_clipped_into_bounds() {
        let env = Environment::with_initial_conditions([18.0, 24.0], 0, 0, 1000.0).unwrap();

        assert_eq!(env.current_number_users(), 10);
        assert_eq!(env.current_rate_data(), 300.0);
    }

    #[test]
    fn test_step_updates_ambient_and_counters() {
        let mut env = seeded(1);
        let (_, reward, done) = env.update_env(Direction::Cool, 0.5, 6).unwrap();

        assert_eq!(env.atmospheric_temperature(), 23.0);
        assert_eq!(env.month().index(), 6);
        assert_eq!(env.total_energy_ai(), 0.5);
        assert!(env.total_energy_noai() > 0.0);
        assert_eq!(env.steps(), 1);
        assert!(!done);
        let expected = 1e-3 * (env.total_energy_noai() - env.total_energy_ai());
        assert!((reward - expected).abs() < 1e-12);
    }

    #[test]
    fn test_update_env_rejects_bad_inputs() {
        let mut env = seeded(1);
        let before = env.state();

        assert_eq!(
            env.update_env(Direction::Cool, 1.0, 12).unwrap_err(),
            EnvError::InvalidMonth(12)
        );
        assert_eq!(
            env.update_env(Direction::Cool, -0.1, 0).unwrap_err(),
            EnvError::InvalidEnergy(-0.1)
        );
        assert!(matches!(
            env.update_env(Direction::Heat, f64::INFINITY, 0),
            Err(EnvError::InvalidEnergy(_))
        ));
        assert_eq!(env.state(), before);
    }

    #[test]
    fn test_terminated_episode_is_absorbing() {
        let mut env = seeded(3);
        let mut done = false;
        for _ in 0..50 {
            done = env.update_env(Direction::Heat, 5.0, 0).unwrap().2;
            if done {
                break;
            }
        }
        assert!(done);

        let snapshot = env.state();
        assert_eq!(
            env.update_env(Direction::Cool, 1.0, 0).unwrap_err(),
            EnvError::EpisodeTerminated
        );
        assert_eq!(env.state(), snapshot);
        assert!(env.observe().2);

        env.reset(0).unwrap();
        assert!(!env.observe().2);
        assert_eq!(env.total_energy_ai(), 0.0);
        assert_eq!(env.steps(), 0);
    }

    #[test]
    fn test_termination_penalty_applied() {
        let config = EnvironmentConfig::with_initial_conditions([18.0, 24.0], 0, 20, 80.0)
            .unwrap()
            .with_random_seed(5);
        let config = EnvironmentConfig {
            termination_penalty: 10.0,
            ..config
        };
        let mut env = Environment::new(config).unwrap();

        let (_, reward, done) = env.update_env(Direction::Heat, 30.0, 0).unwrap();
        assert!(done);
        assert!(reward < -10.0);
    }

    #[test]
    fn test_zero_margin_terminates_on_leaving_band() {
        let config = EnvironmentConfig::with_initial_conditions([18.0, 24.0], 0, 20, 80.0)
            .unwrap()
            .with_random_seed(6)
            .with_safety_margin(0.0);
        let mut env = Environment::new(config).unwrap();
        assert_eq!(env.safety_bounds(), (18.0, 24.0));

        let (obs, _, done) = env.update_env(Direction::Cool, 1.0, 0).unwrap();
        assert!(done);
        assert!(obs.temperature < 0.0);
    }

    #[test]
    fn test_evaluation_mode_corrects_breach() {
        let config = EnvironmentConfig::with_initial_conditions([18.0, 24.0], 0, 20, 80.0)
            .unwrap()
            .with_random_seed(9)
            .with_mode(EpisodeMode::Evaluation);
        let mut env = Environment::new(config).unwrap();

        let (obs, _, done) = env.update_env(Direction::Heat, 30.0, 0).unwrap();

        assert!(!done);
        assert_eq!(env.temperature_ai(), 24.0);
        assert!(env.total_energy_ai() > 30.0);
        assert!(obs.temperature < 1.0);
    }

    #[test]
    fn test_non_finite_step_is_not_committed() {
        let config = EnvironmentConfig::with_initial_conditions([18.0, 24.0], 0, 20, 80.0)
            .unwrap()
            .with_random_seed(10)
            .with_mode(EpisodeMode::Evaluation);
        let mut env = Environment::new(config).unwrap();
        env.update_env(Direction::Cool, 0.5, 1).unwrap();
        let before = env.state();

        let result = env.update_env(Direction::Heat, 1e308, 2);

        assert!(matches!(result, Err(EnvError::Computation(_))));
        assert_eq!(env.state(), before);
        assert!(env.update_env(Direction::Cool, 0.5, 2).is_ok());
    }

    #[test]
    fn test_reset_into_unsafe_month_keeps_state() {
        let mut monthly_temperatures_c = DEFAULT_MONTHLY_TEMPERATURES_C;
        monthly_temperatures_c[6] = 200.0;
        let config = EnvironmentConfig {
            monthly_temperatures_c,
            ..EnvironmentConfig::with_initial_conditions([18.0, 24.0], 0, 20, 80.0)
                .unwrap()
                .with_random_seed(12)
        };
        let mut env = Environment::new(config).unwrap();
        env.update_env(Direction::Cool, 0.5, 1).unwrap();
        let before = env.state();

        assert!(matches!(env.reset(6), Err(EnvError::Configuration(_))));
        assert_eq!(env.state(), before);

        env.reset(0).unwrap();
        assert_eq!(env.steps(), 0);
    }

    #[test]
    fn test_reset_uses_new_month() {
        let mut env = seeded(11);
        env.update_env(Direction::Cool, 1.0, 1).unwrap();

        env.reset(7).unwrap();

        assert_eq!(env.atmospheric_temperature(), 24.0);
        assert_eq!(env.current_number_users(), 20);
        assert_eq!(env.current_rate_data(), 80.0);
        assert!((env.temperature_ai() - (16.0 + 0.25 * 24.0 + 1.0 + 0.8)).abs() < 1e-9);
        assert_eq!(env.observe().1, 0.0);
        assert_eq!(env.reset(-1).unwrap_err(), EnvError::InvalidMonth(-1));
    }

    #[test]
    fn test_reset_with_seed_replays_noise() {
        let mut env = seeded(21);

        env.reset_with_seed(3, 99).unwrap();
        let first: Vec<_> = (0..20)
            .map(|_| env.update_env(Direction::Cool, 0.2, 3).unwrap())
            .collect();

        env.reset_with_seed(3, 99).unwrap();
        let second: Vec<_> = (0..20)
            .map(|_| env.update_env(Direction::Cool, 0.2, 3).unwrap())
            .collect();

        assert_eq!(first, second);
        assert_eq!(env.seed(), 99);
    }

    #[test]
    fn test_observation_vector_layout() {
        let env = seeded(2);
        let (obs, _, _) = env.observe();

        assert_eq!(obs.to_vec(), vec![obs.temperature, obs.number_users, obs.rate_data]);
        assert!((obs.number_users - 10.0 / 90.0).abs() < 1e-12);
        assert!((obs.rate_data - 60.0 / 280.0).abs() < 1e-12);
    }

    #[test]
    fn test_state_snapshot_serializes() {
        let env = seeded(4);
        let json = serde_json::to_value(env.state()).unwrap();

        assert_eq!(json["month"], 0);
        assert_eq!(json["current_number_users"], 20);
        assert_eq!(json["done"], false);
    }
}
