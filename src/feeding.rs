//! Per-category demographic orchestration: die, reproduce, and feed along the
//! fixed food cycle.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::demography::{self, HUNGER_FRACTION};
use crate::environment::Environment;
use crate::registry::{Category, Registry};

/// One category's view of the food chain: who it is and who it eats. The
/// pairing comes from [`Category::prey`], so constructing one per category is
/// infallible and the four rules cover the whole cycle.
#[derive(Debug, Clone, Copy)]
pub struct FeedingRule {
    consumers: Category,
    consumed: Category,
}

impl FeedingRule {
    pub fn for_category(category: Category) -> Self {
        Self {
            consumers: category,
            consumed: category.prey(),
        }
    }

    pub fn consumers(&self) -> Category {
        self.consumers
    }

    pub fn consumed(&self) -> Category {
        self.consumed
    }

    /// Directed feeding: `consumer` eats `count` of `consumed`. Both species
    /// must exist and the prey must have stock, otherwise the call only warns.
    pub fn eat(&self, registry: &mut Registry, consumed: &str, consumer: &str, count: i64) {
        let consumer_exists = registry.get(self.consumers, consumer).is_some();
        let prey_stock = registry
            .get(self.consumed, consumed)
            .map(|record| record.count)
            .unwrap_or(0);

        if consumer_exists && prey_stock > 0 {
            registry.kill(self.consumed, consumed, count);
            tracing::info!(consumer, consumed, count, "feeding");
        } else {
            tracing::warn!(consumer, consumed, "no such consumer or prey in the ecosystem");
        }
    }

    /// Stochastic feeding for one tick: the consumer picks a random prey
    /// species with stock, eats up to its hunger need, and starves for the
    /// shortfall. With no prey available at all, a flat tenth of the
    /// population dies of hunger.
    pub fn eat_random(&self, registry: &mut Registry, consumer: &str, rng: &mut impl Rng) {
        let population = match registry.get(self.consumers, consumer) {
            Some(record) => record.count,
            None => {
                tracing::warn!(consumer, "no such species in the ecosystem");
                return;
            }
        };

        let candidates: Vec<String> = registry
            .species(self.consumed)
            .iter()
            .filter(|(_, record)| record.count > 0)
            .map(|(name, _)| name.clone())
            .collect();

        if let Some(prey) = candidates.choose(rng) {
            let eatable = (population as f64 * HUNGER_FRACTION).ceil() as i64;
            let prey_stock = registry
                .get(self.consumed, prey)
                .map(|record| record.count)
                .unwrap_or(0);
            let actual_eaten = eatable.min(prey_stock);

            if actual_eaten > 0 {
                registry.kill(self.consumed, prey, actual_eaten);
            }
            tracing::info!(consumer, prey = %prey, eaten = actual_eaten, "feeding");

            let hunger_death = eatable - actual_eaten;
            if hunger_death > 0 {
                registry.kill(self.consumers, consumer, hunger_death);
                tracing::warn!(consumer, died = hunger_death, "died of hunger");
            }
        } else {
            let hunger_death = (population as f64 / 10.0).ceil() as i64;
            registry.kill(self.consumers, consumer, hunger_death);
            tracing::warn!(
                consumer,
                died = hunger_death,
                "no available food in the ecosystem"
            );
        }
    }

    /// Environmental deaths for one tick, from the species' own extinction
    /// factor.
    pub fn die(
        &self,
        registry: &mut Registry,
        env: &Environment,
        consumer: &str,
        rng: &mut impl Rng,
    ) {
        let (population, extinction_factor) = match registry.get(self.consumers, consumer) {
            Some(record) => (record.count, record.extinction_factor(env)),
            None => {
                tracing::warn!(consumer, "no such species in the ecosystem");
                return;
            }
        };

        let death_count = demography::deaths(population, extinction_factor, rng);
        registry.kill(self.consumers, consumer, death_count);
        tracing::info!(consumer, died = death_count, "deaths this year");
    }

    /// Births for one tick. Requires at least one individual; populations
    /// under 10 additionally pass through a coin-flip luck gate and may fail
    /// to reproduce entirely.
    pub fn reproduce(
        &self,
        registry: &mut Registry,
        env: &Environment,
        consumer: &str,
        rng: &mut impl Rng,
    ) {
        let (population, birth_factor) = match registry.get(self.consumers, consumer) {
            Some(record) if record.count >= 1 => (record.count, record.birth_factor(env)),
            _ => {
                tracing::warn!(consumer, "not present or not enough population to reproduce");
                return;
            }
        };

        let mut birth_count = demography::births(population, birth_factor, rng);
        if population < 10 {
            birth_count *= rng.gen_range(0..=1);
        }
        registry.create(self.consumers, consumer, birth_count);
        tracing::info!(consumer, born = birth_count, "births this year");
    }
}
