//! # Episode Rollout
//!
//! Drives an [`Environment`] with a caller-supplied decision closure and
//! collects the statistics needed to compare a controller against the
//! fixed-setpoint baseline.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::calendar::Month;
use super::environment::Environment;
use super::error::EnvError;
use super::thermal::Direction;

/// One control decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub direction: Direction,
    pub energy_ai: f64,
    pub month: Month,
}

impl Action {
    pub fn new(direction: Direction, energy_ai: f64, month: Month) -> Self {
        Self {
            direction,
            energy_ai,
            month,
        }
    }

    pub fn cool(energy_ai: f64, month: Month) -> Self {
        Self::new(Direction::Cool, energy_ai, month)
    }

    pub fn heat(energy_ai: f64, month: Month) -> Self {
        Self::new(Direction::Heat, energy_ai, month)
    }
}

/// Aggregate statistics of one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub steps: u64,
    /// Whether the episode ended on a safety breach
    pub terminated: bool,
    /// Mean controlled temperature before each action (°C)
    pub mean_temperature_c: f64,
    pub temperature_std_dev_c: f64,
    /// Share of steps that started inside the optimal band (0..=1)
    pub in_band_fraction: f64,
    pub mean_reward: f64,
    pub total_energy_ai: f64,
    pub total_energy_noai: f64,
    pub energy_saved: f64,
}

/// Run the environment until it terminates or `max_steps` actions were applied
///
/// The environment is not reset first; call `reset` beforehand to start a
/// fresh episode.
///
/// # Arguments
/// * `env` - Environment to drive
/// * `max_steps` - Upper bound on the number of actions
/// * `policy` - Picks the next action from the current environment and step index
pub fn run_episode<F>(
    env: &mut Environment,
    max_steps: u64,
    mut policy: F,
) -> Result<EpisodeSummary, EnvError>
where
    F: FnMut(&Environment, u64) -> Action,
{
    let mut temperatures = Vec::new();
    let mut in_band = 0usize;
    let mut reward_sum = 0.0;
    let mut terminated = env.is_done();

    for step in 0..max_steps {
        if terminated {
            break;
        }

        temperatures.push(env.temperature_ai());
        if env.in_optimal_band() {
            in_band += 1;
        }

        let action = policy(env, step);
        let (_, reward, done) =
            env.update_env(action.direction, action.energy_ai, action.month.index() as i64)?;

        reward_sum += reward;
        terminated = done;
    }

    let steps = temperatures.len();
    let (mean, std_dev) = mean_and_std_dev(&temperatures);
    let summary = EpisodeSummary {
        steps: steps as u64,
        terminated,
        mean_temperature_c: mean,
        temperature_std_dev_c: std_dev,
        in_band_fraction: if steps == 0 {
            0.0
        } else {
            in_band as f64 / steps as f64
        },
        mean_reward: if steps == 0 {
            0.0
        } else {
            reward_sum / steps as f64
        },
        total_energy_ai: env.total_energy_ai(),
        total_energy_noai: env.total_energy_noai(),
        energy_saved: env.energy_saved(),
    };

    info!(
        steps = summary.steps,
        terminated = summary.terminated,
        mean_temperature_c = summary.mean_temperature_c,
        energy_saved = summary.energy_saved,
        "episode finished"
    );

    Ok(summary)
}

/// Population mean and standard deviation; zeros for an empty slice
fn mean_and_std_dev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::EnvironmentConfig;

    fn env(seed: u64) -> Environment {
        let config = EnvironmentConfig::with_initial_conditions([18.0, 24.0], 0, 20, 80.0)
            .unwrap()
            .with_random_seed(seed);
        Environment::new(config).unwrap()
    }

    #[test]
    fn test_idle_policy_runs_to_step_limit() {
        let mut env = env(42);

        let summary = run_episode(&mut env, 30, |_, _| Action::cool(0.0, Month::JANUARY)).unwrap();

        assert_eq!(summary.steps, 30);
        assert!(!summary.terminated);
        assert_eq!(summary.total_energy_ai, 0.0);
        assert!(summary.energy_saved >= 0.0);
        assert!(summary.mean_reward >= 0.0);
    }

    #[test]
    fn test_runaway_heating_stops_at_termination() {
        let mut env = env(7);

        let summary = run_episode(&mut env, 100, |_, _| Action::heat(5.0, Month::JANUARY)).unwrap();

        assert!(summary.terminated);
        assert!(summary.steps < 100);
        assert_eq!(summary.total_energy_ai, 5.0 * summary.steps as f64);
    }

    #[test]
    fn test_policy_sees_step_index() {
        let mut env = env(1);
        let mut seen = Vec::new();

        run_episode(&mut env, 5, |_, step| {
            seen.push(step);
            Action::cool(0.1, Month::JANUARY)
        })
        .unwrap();

        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_terminated_environment_yields_empty_summary() {
        let mut env = env(3);
        run_episode(&mut env, 100, |_, _| Action::heat(10.0, Month::JANUARY)).unwrap();

        let summary = run_episode(&mut env, 10, |_, _| Action::cool(1.0, Month::JANUARY)).unwrap();

        assert_eq!(summary.steps, 0);
        assert!(summary.terminated);
    }

    #[test]
    fn test_mean_and_std_dev() {
        assert_eq!(mean_and_std_dev(&[]), (0.0, 0.0));
        let (mean, std_dev) = mean_and_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(mean, 5.0);
        assert_eq!(std_dev, 2.0);
    }
}
