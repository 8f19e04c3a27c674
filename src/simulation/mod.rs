//! # Server Room Simulation Module
//!
//! A data-center cooling environment for training and evaluating control
//! policies. The room temperature follows the seasonal ambient baseline and a
//! randomly fluctuating load; the policy drives a cooling/heating actuator and
//! is rewarded for the energy it saves compared with a controller that pins
//! the temperature to a fixed setpoint.
//!
//! ## Components
//!
//! - **Calendar**: month index and the monthly ambient temperature profile
//! - **Load**: bounded random walks for active users and data rate
//! - **Thermal**: intrinsic temperature, actuator effect and baseline energy
//! - **Environment**: the state machine tying the above together
//! - **Episode**: rollout helper producing summary statistics
//!
//! ## Usage
//!
//! ```rust
//! use server_cooling_env::simulation::{Direction, Environment, EnvironmentConfig};
//!
//! let config = EnvironmentConfig::with_initial_conditions([18.0, 24.0], 0, 20, 80.0)
//!     .unwrap()
//!     .with_random_seed(42);
//! let mut env = Environment::new(config).unwrap();
//!
//! let (state, reward, done) = env.observe();
//! assert!(!done);
//!
//! let (next_state, reward, done) = env.update_env(Direction::Cool, 2.0, 1).unwrap();
//! if done {
//!     env.reset(0).unwrap();
//! }
//! ```

pub mod calendar;
pub mod environment;
pub mod episode;
pub mod error;
pub mod load;
pub mod thermal;

pub use calendar::{Month, SeasonalProfile, DEFAULT_MONTHLY_TEMPERATURES_C};
pub use environment::{
    Environment, EnvironmentConfig, EnvironmentState, EpisodeMode, Observation, StepOutcome,
};
pub use episode::{run_episode, Action, EpisodeSummary};
pub use error::EnvError;
pub use load::{LoadState, ServerLoad, WalkBounds};
pub use thermal::{Direction, ThermalCoefficients};
