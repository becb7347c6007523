use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::demography::CategoryTotals;
use crate::environment::Environment;
use crate::registry::{Category, Registry};

/// The whole simulated state: world conditions plus every living population.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    pub environment: Environment,
    pub registry: Registry,
}

/// Handle shared between the console and the background tick loop. A single
/// lock serializes the two; neither side holds it across a sleep or a prompt.
pub type SharedWorld = Arc<Mutex<World>>;

impl World {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            registry: Registry::new(),
        }
    }

    pub fn into_shared(self) -> SharedWorld {
        Arc::new(Mutex::new(self))
    }

    pub fn totals(&self) -> CategoryTotals {
        CategoryTotals {
            plants: self.registry.total_count(Category::Plant),
            herbivores: self.registry.total_count(Category::Herbivore),
            predators: self.registry.total_count(Category::Predator),
            decomposers: self.registry.total_count(Category::Decomposer),
        }
    }
}
