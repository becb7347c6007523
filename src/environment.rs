use serde::{Deserialize, Serialize};

/// Shared world conditions: the simulation clock plus the three
/// environmental axes every species is scored against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub year: i64,
    pub temperature: i32,
    pub accessible_water: i32,
    pub humidity: i32,
}

impl Environment {
    pub fn new(year: i64, temperature: i32, accessible_water: i32, humidity: i32) -> Self {
        Self {
            year,
            temperature,
            accessible_water,
            humidity,
        }
    }
}
