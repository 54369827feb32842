//! Simulation settings loadable from YAML.
//!
//! Every field has a default, so a file only needs the values it overrides:
//!
//! ```yaml
//! time_step: 144000.0          # seconds per step
//! gravitational_constant: 6.6743e-11
//! negligible_mass_ratio: 0.001 # omit to disable the skip
//! use_rayon: false
//!
//! belt:
//!   count: 1000
//!   mean_radius: 4.0e11        # meters
//!   min_speed_factor: 0.6
//!   max_speed_factor: 1.2
//!   vertical_speed: 100.0      # m/s, symmetric range
//!   mass: 1.0e12               # kg
//!   radius: 2.0e3              # m
//!   seed: 42                   # omit for a random seed
//! ```

use crate::{error::SimError, gravity::Gravity, simulation::Simulation};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Seconds in one day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Step-level settings for a [`Simulation`](crate::Simulation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed time step in seconds.
    pub time_step: f64,

    /// Gravitational constant in N·m²/kg².
    pub gravitational_constant: f64,

    /// Optional mass-ratio skip between secondary bodies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negligible_mass_ratio: Option<f64>,

    /// Use Rayon for force accumulation and integration.
    pub use_rayon: bool,

    /// Asteroid belt generation settings.
    pub belt: BeltConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: Simulation::DEFAULT_TIME_STEP,
            gravitational_constant: Gravity::G,
            negligible_mass_ratio: None,
            use_rayon: false,
            belt: BeltConfig::default(),
        }
    }
}

/// Parameters of the generated asteroid belt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltConfig {
    /// Number of asteroids to generate.
    pub count: usize,

    /// Mean belt radius in meters.
    pub mean_radius: f64,

    /// Lower bound of the circular-speed multiplier.
    pub min_speed_factor: f64,

    /// Upper bound of the circular-speed multiplier.
    pub max_speed_factor: f64,

    /// Out-of-plane speed is drawn from `[-vertical_speed, vertical_speed]`.
    pub vertical_speed: f64,

    /// Mass of each asteroid in kilograms.
    pub mass: f64,

    /// Visual radius of each asteroid in meters.
    pub radius: f64,

    /// Seed for reproducible belts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for BeltConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            mean_radius: 4e11,
            min_speed_factor: 0.6,
            max_speed_factor: 1.2,
            vertical_speed: 1e2,
            // Typical asteroid: one billion tons, 2 km across
            mass: 1e12,
            radius: 2e3,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SimError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded simulation config");
        Ok(config)
    }

    /// Serializes the config as YAML.
    pub fn to_yaml_string(&self) -> Result<String, SimError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks step, force and belt settings for values the simulation cannot use.
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.time_step.is_finite() || self.time_step < 0.0 {
            return Err(SimError::InvalidTimeStep(self.time_step));
        }
        if !(self.gravitational_constant.is_finite() && self.gravitational_constant > 0.0) {
            return Err(SimError::Config(format!(
                "gravitational_constant must be positive, got {}",
                self.gravitational_constant
            )));
        }
        if let Some(ratio) = self.negligible_mass_ratio {
            if !(0.0..1.0).contains(&ratio) {
                return Err(SimError::Config(format!(
                    "negligible_mass_ratio must be in [0, 1), got {}",
                    ratio
                )));
            }
        }
        self.belt.validate()
    }
}

impl BeltConfig {
    /// Checks that radii, masses and speed ranges are usable.
    pub fn validate(&self) -> Result<(), SimError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(SimError::Config(format!("belt.{} must be positive, got {}", name, v)))
            }
        };
        positive("mean_radius", self.mean_radius)?;
        positive("mass", self.mass)?;
        positive("radius", self.radius)?;
        positive("min_speed_factor", self.min_speed_factor)?;

        if self.max_speed_factor < self.min_speed_factor {
            return Err(SimError::Config(format!(
                "belt speed factor range is empty: [{}, {}]",
                self.min_speed_factor, self.max_speed_factor
            )));
        }
        if !(self.vertical_speed.is_finite() && self.vertical_speed >= 0.0) {
            return Err(SimError::Config(format!(
                "belt.vertical_speed must be non-negative, got {}",
                self.vertical_speed
            )));
        }
        Ok(())
    }
}
