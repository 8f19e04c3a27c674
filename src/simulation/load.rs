//! # Server Load Simulation
//!
//! Active user count and data processing rate. Both follow an independent
//! bounded random walk: every step adds a uniform integer delta and clips the
//! result to the configured range.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bounds and step size of one random-walk quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkBounds {
    pub min: f64,
    pub max: f64,
    /// Largest absolute change per step
    pub max_step: u32,
}

impl WalkBounds {
    pub fn new(min: f64, max: f64, max_step: u32) -> Self {
        Self { min, max, max_step }
    }

    pub fn clip(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Position of `value` inside the range, 0.0 at `min` and 1.0 at `max`
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn sample_delta<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let step = self.max_step as i64;
        rng.gen_range(-step..=step) as f64
    }
}

/// Snapshot of the load side of the room
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadState {
    pub number_users: u32,
    pub rate_data: f64,
}

/// Bounded random walk for users and data rate
#[derive(Debug, Clone)]
pub struct ServerLoad {
    users: WalkBounds,
    rate: WalkBounds,
    state: LoadState,
}

impl ServerLoad {
    /// Start the walk at the given values, clipped into bounds
    pub fn new(users: WalkBounds, rate: WalkBounds, number_users: u32, rate_data: f64) -> Self {
        let state = LoadState {
            number_users: users.clip(number_users as f64) as u32,
            rate_data: rate.clip(rate_data),
        };

        Self { users, rate, state }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn number_users(&self) -> u32 {
        self.state.number_users
    }

    pub fn rate_data(&self) -> f64 {
        self.state.rate_data
    }

    pub fn user_bounds(&self) -> &WalkBounds {
        &self.users
    }

    pub fn rate_bounds(&self) -> &WalkBounds {
        &self.rate
    }

    /// Normalized (users, rate) pair for observations
    pub fn normalized(&self) -> (f64, f64) {
        (
            self.users.normalize(self.state.number_users as f64),
            self.rate.normalize(self.state.rate_data),
        )
    }

    /// Advance both walks by one step. Users are drawn before data rate.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> LoadState {
        let users_delta = self.users.sample_delta(rng);
        let rate_delta = self.rate.sample_delta(rng);

        let users = self.users.clip(self.state.number_users as f64 + users_delta);
        self.state = LoadState {
            number_users: users as u32,
            rate_data: self.rate.clip(self.state.rate_data + rate_delta),
        };
        self.state
    }

    /// Jump back to a given state, clipped into bounds
    pub fn restore(&mut self, number_users: u32, rate_data: f64) {
        self.state = LoadState {
            number_users: self.users.clip(number_users as f64) as u32,
            rate_data: self.rate.clip(rate_data),
        };
    }
}
