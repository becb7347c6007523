//! The authoritative store of all living populations: one mapping of species
//! name to [`SpeciesRecord`] per creature category.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::species::SpeciesRecord;

/// A free-text category the console or a file handed us that is none of the
/// four known ones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

/// The four fixed creature classes. Internal code dispatches on this enum;
/// only the console and file boundaries parse free text into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Plant,
    Herbivore,
    Predator,
    Decomposer,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Plant,
        Category::Herbivore,
        Category::Predator,
        Category::Decomposer,
    ];

    /// The category this one feeds on. The chain is a closed 4-cycle:
    /// plants feed on decomposers, decomposers on predators, predators on
    /// herbivores, herbivores on plants.
    pub fn prey(self) -> Category {
        match self {
            Category::Plant => Category::Decomposer,
            Category::Herbivore => Category::Plant,
            Category::Predator => Category::Herbivore,
            Category::Decomposer => Category::Predator,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Plant => "PLANT",
            Category::Herbivore => "HERBIVORE",
            Category::Predator => "PREDATOR",
            Category::Decomposer => "DECOMPOSER",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PLANT" => Ok(Category::Plant),
            "HERBIVORE" => Ok(Category::Herbivore),
            "PREDATOR" => Ok(Category::Predator),
            "DECOMPOSER" => Ok(Category::Decomposer),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Four independent species mappings, keyed by uppercased species name.
/// A name is unique within its category but may repeat across categories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    plants: BTreeMap<String, SpeciesRecord>,
    herbivores: BTreeMap<String, SpeciesRecord>,
    predators: BTreeMap<String, SpeciesRecord>,
    decomposers: BTreeMap<String, SpeciesRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn species(&self, category: Category) -> &BTreeMap<String, SpeciesRecord> {
        match category {
            Category::Plant => &self.plants,
            Category::Herbivore => &self.herbivores,
            Category::Predator => &self.predators,
            Category::Decomposer => &self.decomposers,
        }
    }

    fn species_mut(&mut self, category: Category) -> &mut BTreeMap<String, SpeciesRecord> {
        match category {
            Category::Plant => &mut self.plants,
            Category::Herbivore => &mut self.herbivores,
            Category::Predator => &mut self.predators,
            Category::Decomposer => &mut self.decomposers,
        }
    }

    pub fn get(&self, category: Category, species: &str) -> Option<&SpeciesRecord> {
        self.species(category).get(&species.to_uppercase())
    }

    pub fn species_names(&self, category: Category) -> Vec<String> {
        self.species(category).keys().cloned().collect()
    }

    pub fn total_count(&self, category: Category) -> i64 {
        self.species(category)
            .values()
            .map(|record| record.count)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL
            .iter()
            .all(|&category| self.species(category).is_empty())
    }

    /// Inserts the species, overwriting any existing record of that name.
    pub fn add(&mut self, category: Category, species: &str, record: SpeciesRecord) {
        self.species_mut(category)
            .insert(species.to_uppercase(), record);
    }

    /// Subtracts `count` from the species' population. Driving the result to
    /// zero or below removes the species entirely. A missing species is a
    /// logged no-op.
    pub fn kill(&mut self, category: Category, species: &str, count: i64) {
        self.apply_delta(category, species, -count);
    }

    /// Adds `count` to the species' population, with the same extinction rule
    /// as [`kill`]: a non-positive result removes the entry.
    ///
    /// [`kill`]: Registry::kill
    pub fn create(&mut self, category: Category, species: &str, count: i64) {
        self.apply_delta(category, species, count);
    }

    fn apply_delta(&mut self, category: Category, species: &str, delta: i64) {
        let key = species.to_uppercase();
        let map = self.species_mut(category);
        match map.get_mut(&key) {
            Some(record) => {
                record.count += delta;
                if record.count <= 0 {
                    map.remove(&key);
                    warn!(category = %category, species = %key, "species went extinct");
                }
            }
            None => warn!(category = %category, species = %key, "no such species"),
        }
    }

    /// Merge-style upsert: adds to an existing record's count, or creates a
    /// new record whose comfort fields default to zero. The same extinction
    /// rule applies, so a non-positive merged count removes the entry.
    pub fn update(&mut self, category: Category, species: &str, count: i64) {
        let key = species.to_uppercase();
        let comfort_temperature = self
            .get(category, &key)
            .map(|record| record.comfort_temperature)
            .unwrap_or(0);
        let map = self.species_mut(category);
        let record = map
            .entry(key.clone())
            .and_modify(|existing| existing.count += count)
            .or_insert_with(|| SpeciesRecord::new(count, comfort_temperature, 0, 0));
        if record.count <= 0 {
            map.remove(&key);
        }
    }
}
