//! The runtime configuration owned by an interpreter.
use std::time::Duration;

use crate::{
    definitions::{cpu, timer},
    ConfigError,
};

/// How fast the two periodic tasks of the interpreter run.
///
/// Both rates are scaled by the same speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    speed: f64,
    cpu_hertz: u32,
    timer_hertz: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed: 1.0,
            cpu_hertz: cpu::HERTZ,
            timer_hertz: timer::HERTZ,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    /// Sets the speed multiplier, it has to be a positive finite number.
    pub fn with_speed(mut self, speed: f64) -> Result<Self, ConfigError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ConfigError::InvalidSpeed(speed));
        }
        self.speed = speed;
        Ok(self)
    }

    /// Sets the nominal cpu rate, clamped to at least one cycle per second.
    pub fn with_cpu_hertz(mut self, hertz: u32) -> Self {
        self.cpu_hertz = hertz.max(1);
        self
    }

    /// Sets the nominal timer rate, clamped to at least one tick per second.
    pub fn with_timer_hertz(mut self, hertz: u32) -> Self {
        self.timer_hertz = hertz.max(1);
        self
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn cpu_hertz(&self) -> u32 {
        self.cpu_hertz
    }

    pub fn timer_hertz(&self) -> u32 {
        self.timer_hertz
    }

    /// The time between two cpu cycles.
    pub fn cpu_interval(&self) -> Duration {
        Self::interval(self.cpu_hertz, self.speed)
    }

    /// The time between two timer ticks.
    pub fn timer_interval(&self) -> Duration {
        Self::interval(self.timer_hertz, self.speed)
    }

    fn interval(hertz: u32, speed: f64) -> Duration {
        const NANOS_PER_SEC: f64 = 1_000_000_000.0;
        Duration::from_nanos((NANOS_PER_SEC / (hertz as f64 * speed)).round() as u64)
    }
}
