//! Damped spring used to animate scroll offsets.

use std::time::Duration;
use tokio::time::Instant;

/// Integration step; small enough to stay stable for stiff springs.
const SUBSTEP: f64 = 1.0 / 240.0;

/// Longest gap integrated in one step. A stalled frame resumes from where it
/// left off instead of jumping.
const MAX_FRAME: Duration = Duration::from_millis(100);

/// Interval between animation frames while a spring is moving.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub stiffness: f64,
    pub damping: f64,
    /// Distance from the target under which the spring may come to rest.
    pub rest_delta: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            stiffness: 170.0,
            damping: 26.0,
            rest_delta: 0.5,
        }
    }
}

/// Result of advancing a spring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpringStep {
    Moving(f64),
    Settled(f64),
}

impl SpringStep {
    pub fn position(self) -> f64 {
        match self {
            Self::Moving(p) | Self::Settled(p) => p,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpringScroll {
    params: SpringParams,
    position: f64,
    velocity: f64,
    target: f64,
    last: Instant,
}

impl SpringScroll {
    pub fn new(from: f64, target: f64, params: SpringParams, now: Instant) -> Self {
        Self {
            params,
            position: from,
            velocity: 0.0,
            target,
            last: now,
        }
    }

    fn at_rest(&self) -> bool {
        // Rest speed scales with rest distance so row-sized units settle too
        (self.target - self.position).abs() < self.params.rest_delta
            && self.velocity.abs() < self.params.rest_delta * 20.0
    }

    /// Advance the simulation to `now`.
    pub fn step(&mut self, now: Instant) -> SpringStep {
        let elapsed = now.saturating_duration_since(self.last).min(MAX_FRAME);
        self.last = now;

        let mut remaining = elapsed.as_secs_f64();
        while remaining > 0.0 && !self.at_rest() {
            let dt = remaining.min(SUBSTEP);
            let displacement = self.position - self.target;
            let accel = -self.params.stiffness * displacement - self.params.damping * self.velocity;
            self.velocity += accel * dt;
            self.position += self.velocity * dt;
            remaining -= dt;
        }

        if !self.position.is_finite() || !self.velocity.is_finite() || self.at_rest() {
            self.position = self.target;
            self.velocity = 0.0;
            SpringStep::Settled(self.target)
        } else {
            SpringStep::Moving(self.position)
        }
    }
}
