//! Per-species demographic profile and its environmental response curves.

use serde::{Deserialize, Serialize};

use crate::environment::Environment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub count: i64,
    pub comfort_temperature: i32,
    pub water_per_individual: i32,
    pub comfort_humidity: i32,
}

impl SpeciesRecord {
    pub fn new(
        count: i64,
        comfort_temperature: i32,
        water_per_individual: i32,
        comfort_humidity: i32,
    ) -> Self {
        Self {
            count,
            comfort_temperature,
            water_per_individual,
            comfort_humidity,
        }
    }

    /// Inverse-combined environmental mismatch multiplier. Larger values mean
    /// worse odds: the product of the three comfort factors is inverted, so a
    /// species in ideal conditions sees 1/(1.2 * 1.2 * 1.4).
    pub fn extinction_factor(&self, env: &Environment) -> f64 {
        1.0 / (self.temperature_factor(env) * self.humidity_factor(env) * self.water_factor(env))
    }

    /// Direct-combined environmental match multiplier, scaled down by 1.5.
    /// Deliberately not the reciprocal of [`extinction_factor`]: births grow
    /// with the raw product while deaths grow with its inverse.
    ///
    /// [`extinction_factor`]: SpeciesRecord::extinction_factor
    pub fn birth_factor(&self, env: &Environment) -> f64 {
        self.temperature_factor(env) * self.humidity_factor(env) * self.water_factor(env) / 1.5
    }

    fn temperature_factor(&self, env: &Environment) -> f64 {
        match (env.temperature - self.comfort_temperature).abs() {
            0 => 1.2,
            1..=5 => 1.1,
            6..=10 => 1.0,
            11..=20 => 0.8,
            _ => 0.5,
        }
    }

    fn humidity_factor(&self, env: &Environment) -> f64 {
        match (env.humidity - self.comfort_humidity).abs() {
            0 => 1.2,
            1..=5 => 1.1,
            6..=20 => 1.0,
            21..=50 => 0.8,
            _ => 0.5,
        }
    }

    // Water uses the signed surplus, not a distance: any surplus is equally
    // good, deficits step down with depth.
    fn water_factor(&self, env: &Environment) -> f64 {
        let delta = env.accessible_water - self.water_per_individual;
        if delta >= 0 {
            1.4
        } else if delta >= -50 {
            0.9
        } else if delta >= -100 {
            0.8
        } else if delta >= -150 {
            0.6
        } else {
            0.3
        }
    }
}
