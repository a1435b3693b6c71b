//! Tuning constants for the simulation.
//!
//! Everything has a default matching the stock scene (four planets and a sun).
//! The only runtime overrides come from the environment:
//!
//! - `ORBIT_SANDBOX_SEED`: `u64` seed for the initial conditions
//! - `ORBIT_SANDBOX_PLANETS`: number of planets

use std::env;
use thiserror::Error;

pub const SEED_ENV: &str = "ORBIT_SANDBOX_SEED";
pub const PLANETS_ENV: &str = "ORBIT_SANDBOX_PLANETS";

/// Default distance below which the gravity magnitude stops growing.
pub const DEFAULT_MIN_DISTANCE: f32 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("{name} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("viewport must have a positive size, got {width}x{height}")]
    EmptyViewport { width: f32, height: f32 },

    #[error("body {index} is invalid: {reason}")]
    InvalidBody { index: usize, reason: &'static str },

    #[error("could not parse environment variable {name}={value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub planets: usize,
    pub planet_mass: f32,
    pub planet_radius: f32,
    pub planet_restitution: f32,
    pub sun_mass: f32,
    pub sun_radius: f32,
    pub sun_restitution: f32,
    /// Each planet velocity component is drawn from `[-velocity_factor, velocity_factor)`
    pub velocity_factor: f32,
    /// Distance kept between spawned planets and the viewport edge
    pub spawn_margin: f32,
    pub wall_thickness: f32,
    pub wall_restitution: f32,
    /// Multiplier `k` on every gravitational force
    pub gravity_scale: f32,
    pub min_distance: f32,
    /// Fraction of the pointer offset closed per tick while dragging
    pub drag_stiffness: f32,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            planets: 4,
            planet_mass: 5.0,
            planet_radius: 10.0,
            planet_restitution: 1.0,
            sun_mass: 1000.0,
            sun_radius: 20.0,
            sun_restitution: 0.0,
            velocity_factor: 0.5,
            spawn_margin: 20.0,
            wall_thickness: 50.0,
            wall_restitution: 1.0,
            gravity_scale: 0.001,
            min_distance: DEFAULT_MIN_DISTANCE,
            drag_stiffness: 0.2,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Defaults with the environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|name| env::var(name).ok())
    }

    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(SEED_ENV) {
            self.seed = Some(parse_env(SEED_ENV, value)?);
        }
        if let Some(value) = lookup(PLANETS_ENV) {
            self.planets = parse_env(PLANETS_ENV, value)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("planet_mass", self.planet_mass)?;
        positive("planet_radius", self.planet_radius)?;
        positive("sun_mass", self.sun_mass)?;
        positive("sun_radius", self.sun_radius)?;
        positive("wall_thickness", self.wall_thickness)?;
        positive("min_distance", self.min_distance)?;
        non_negative("velocity_factor", self.velocity_factor)?;
        non_negative("spawn_margin", self.spawn_margin)?;
        non_negative("gravity_scale", self.gravity_scale)?;
        in_range("planet_restitution", self.planet_restitution, 0.0, 1.0)?;
        in_range("sun_restitution", self.sun_restitution, 0.0, 1.0)?;
        in_range("wall_restitution", self.wall_restitution, 0.0, 1.0)?;
        in_range("drag_stiffness", self.drag_stiffness, f32::MIN_POSITIVE, 1.0)?;
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

fn in_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}
