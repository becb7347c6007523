use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::environment::Environment;
use crate::registry::Category;
use crate::species::SpeciesRecord;
use crate::world::World;

/// A named starting setup: initial world conditions plus the species roster,
/// loaded from YAML.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub conditions: InitialConditions,
    #[serde(default)]
    pub species: Vec<SpeciesInit>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InitialConditions {
    #[serde(default)]
    pub year: i64,
    pub temperature: i32,
    pub accessible_water: i32,
    pub humidity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesInit {
    pub category: Category,
    pub name: String,
    pub count: i64,
    pub comfort_temperature: i32,
    pub water_per_individual: i32,
    pub comfort_humidity: i32,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }

    pub fn build_world(&self) -> World {
        let conditions = Environment::new(
            self.conditions.year,
            self.conditions.temperature,
            self.conditions.accessible_water,
            self.conditions.humidity,
        );
        let mut world = World::new(conditions);
        for init in &self.species {
            let record = SpeciesRecord::new(
                init.count,
                init.comfort_temperature,
                init.water_per_individual,
                init.comfort_humidity,
            );
            world.registry.add(init.category, &init.name, record);
        }
        world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_world_from_yaml() {
        let yaml = r#"
name: pond
conditions:
  temperature: 18
  accessible_water: 200
  humidity: 60
species:
  - category: PLANT
    name: reed
    count: 500
    comfort_temperature: 18
    water_per_individual: 10
    comfort_humidity: 65
  - category: DECOMPOSER
    name: snail
    count: 80
    comfort_temperature: 16
    water_per_individual: 4
    comfort_humidity: 70
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        let world = scenario.build_world();

        assert_eq!(world.environment, Environment::new(0, 18, 200, 60));
        assert_eq!(world.registry.get(Category::Plant, "REED").unwrap().count, 500);
        assert_eq!(
            world.registry.get(Category::Decomposer, "SNAIL").unwrap().count,
            80
        );
    }

    #[test]
    fn shipped_scenario_parses() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/meadow.yaml");
        let scenario = Scenario::load(path).unwrap();
        assert_eq!(scenario.name, "meadow");
        let world = scenario.build_world();
        assert!(!world.registry.is_empty());
        for category in Category::ALL {
            assert!(
                !world.registry.species(category).is_empty(),
                "meadow should seed every category"
            );
        }
    }
}
