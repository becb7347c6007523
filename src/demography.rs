//! Stateless demographic arithmetic: stochastic death and birth counts plus
//! the per-category survival-chance diagnostics shown by the console.

use rand::Rng;

use crate::environment::Environment;
use crate::species::SpeciesRecord;

/// Fraction of a population at stake in a single tick's births and deaths.
pub const TAKE_FRACTION: f64 = 0.1;

/// Fraction of a consumer population that wants to feed each tick.
pub const HUNGER_FRACTION: f64 = 0.15;

/// Populations at or below this size get the all-or-nothing integer death
/// multiplier instead of smooth scaling.
pub const SMALL_POPULATION_BORDER: i64 = 100;

/// Death count for one tick. The random draw is uniform in [90, 200); large
/// populations scale smoothly by draw/100, small populations by the *rounded*
/// draw/100, an integer multiplier that makes small-population deaths lumpy.
/// Always a non-negative integer.
pub fn deaths(population: i64, extinction_factor: f64, rng: &mut impl Rng) -> i64 {
    let base = population as f64 * TAKE_FRACTION * extinction_factor;
    let draw = rng.gen_range(90.0..200.0);
    let scaled = if population > SMALL_POPULATION_BORDER {
        base * draw / 100.0
    } else {
        base * (draw / 100.0).round()
    };
    scaled.ceil() as i64
}

/// Birth count for one tick: population x take-fraction x birth factor x a
/// uniform draw in [0, 1.2), ceilinged. No small-population branch; the
/// asymmetry with [`deaths`] is deliberate.
pub fn births(population: i64, birth_factor: f64, rng: &mut impl Rng) -> i64 {
    let draw = rng.gen_range(0.0..1.2);
    (population as f64 * TAKE_FRACTION * birth_factor * draw).ceil() as i64
}

/// Category totals the survival-chance formulas weigh populations against.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryTotals {
    pub plants: i64,
    pub herbivores: i64,
    pub predators: i64,
    pub decomposers: i64,
}

// The four survival scores are display-only diagnostics. Each combines the
// species' own birth/extinction factors with population-pressure ratios; a
// zero denominator substitutes the formula's "no pressure" sentinel instead
// of failing. All are clamped to a minimum of 0.

pub fn herbivore_survival_chance(
    record: &SpeciesRecord,
    totals: CategoryTotals,
    env: &Environment,
) -> f64 {
    let predator_ratio = if totals.predators > 0 {
        record.count as f64 / totals.predators as f64
    } else {
        f64::MAX
    };
    let plant_ratio = if totals.plants > 0 {
        totals.plants as f64 / record.count as f64
    } else {
        0.0
    };
    let chance =
        (record.birth_factor(env) - record.extinction_factor(env)) * predator_ratio * plant_ratio;
    chance.max(0.0)
}

pub fn predator_survival_chance(
    record: &SpeciesRecord,
    totals: CategoryTotals,
    env: &Environment,
) -> f64 {
    let herbivore_ratio = if totals.herbivores > 0 {
        totals.herbivores as f64 / record.count as f64
    } else {
        0.0
    };
    let decomposer_effect = if totals.decomposers > 0 {
        totals.decomposers as f64 / record.count as f64
    } else {
        0.5
    };
    let chance = (record.birth_factor(env) - record.extinction_factor(env)) * herbivore_ratio
        / (1.0 + decomposer_effect);
    chance.max(0.0)
}

pub fn plant_survival_chance(
    record: &SpeciesRecord,
    totals: CategoryTotals,
    env: &Environment,
) -> f64 {
    let herbivore_ratio = if totals.herbivores > 0 {
        totals.herbivores as f64 / record.count as f64
    } else {
        0.0
    };
    let chance =
        (record.birth_factor(env) - record.extinction_factor(env)) / (1.0 + herbivore_ratio);
    chance.max(0.0)
}

pub fn decomposer_survival_chance(
    record: &SpeciesRecord,
    totals: CategoryTotals,
    env: &Environment,
) -> f64 {
    let predator_ratio = if totals.predators > 0 {
        totals.predators as f64 / record.count as f64
    } else {
        0.0
    };
    let chance = (record.birth_factor(env) - record.extinction_factor(env)) * predator_ratio;
    chance.max(0.0)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn deaths_and_births_are_non_negative_integers() {
        let mut rng = rng(11);
        for population in [0, 1, 9, 100, 101, 10_000] {
            for factor in [0.0, 0.3, 1.0, 2.4] {
                assert!(deaths(population, factor, &mut rng) >= 0);
                assert!(births(population, factor, &mut rng) >= 0);
            }
        }
    }

    #[test]
    fn small_population_deaths_use_integer_multiplier_only() {
        // At or below the border the random scale collapses to round(draw/100),
        // so every outcome must be ceil(base) or ceil(2 * base); 0 could only
        // come from a zero factor.
        let population = SMALL_POPULATION_BORDER;
        let factor = 1.3;
        let base = population as f64 * TAKE_FRACTION * factor;
        let allowed = [base.ceil() as i64, (base * 2.0).ceil() as i64];

        let mut rng = rng(29);
        for _ in 0..200 {
            let observed = deaths(population, factor, &mut rng);
            assert!(
                allowed.contains(&observed),
                "deaths {} outside the integer-multiplier set {:?}",
                observed,
                allowed
            );
        }
    }

    #[test]
    fn large_population_deaths_stay_in_draw_bounds() {
        let population = 10 * SMALL_POPULATION_BORDER;
        let factor = 1.0;
        let base = population as f64 * TAKE_FRACTION * factor;

        let mut rng = rng(37);
        for _ in 0..200 {
            let observed = deaths(population, factor, &mut rng);
            assert!(observed >= (base * 0.9).ceil() as i64);
            assert!(observed <= (base * 2.0).ceil() as i64);
        }
    }

    #[test]
    fn births_stay_in_draw_bounds() {
        let population = 1_000;
        let factor = 1.344; // ideal-conditions birth factor
        let cap = (population as f64 * TAKE_FRACTION * factor * 1.2).ceil() as i64;

        let mut rng = rng(43);
        for _ in 0..200 {
            let observed = births(population, factor, &mut rng);
            assert!(observed >= 0);
            assert!(observed <= cap);
        }
    }

    #[test]
    fn zero_population_denominators_use_sentinels() {
        let record = SpeciesRecord::new(50, 20, 5, 40);
        let env = Environment::new(0, 20, 100, 40);
        let none = CategoryTotals::default();

        // No plants -> herbivores see zero food, chance bottoms out.
        assert_eq!(herbivore_survival_chance(&record, none, &env), 0.0);
        // No herbivores -> predators have nothing to hunt.
        assert_eq!(predator_survival_chance(&record, none, &env), 0.0);
        // No herbivores -> plants ungrazed; ideal conditions give a positive
        // chance of exactly birth - extinction.
        let expected = record.birth_factor(&env) - record.extinction_factor(&env);
        assert_eq!(plant_survival_chance(&record, none, &env), expected);
        // No predators -> decomposers have no carrion ratio.
        assert_eq!(decomposer_survival_chance(&record, none, &env), 0.0);
    }

    #[test]
    fn survival_chances_clamp_at_zero() {
        // Hostile conditions drive birth - extinction negative; the score
        // must clamp instead of going negative.
        let record = SpeciesRecord::new(50, 20, 500, 40);
        let env = Environment::new(0, 90, -400, 100);
        let totals = CategoryTotals {
            plants: 100,
            herbivores: 100,
            predators: 100,
            decomposers: 100,
        };

        assert!(record.birth_factor(&env) < record.extinction_factor(&env));
        assert_eq!(herbivore_survival_chance(&record, totals, &env), 0.0);
        assert_eq!(predator_survival_chance(&record, totals, &env), 0.0);
        assert_eq!(plant_survival_chance(&record, totals, &env), 0.0);
        assert_eq!(decomposer_survival_chance(&record, totals, &env), 0.0);
    }
}
