//! Tick orchestration and the background simulation loop.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::Rng;
use tracing::{error, info};

use crate::feeding::FeedingRule;
use crate::registry::Category;
use crate::world::{SharedWorld, World};

/// Category processing order within one tick.
pub const TICK_ORDER: [Category; 4] = [
    Category::Predator,
    Category::Herbivore,
    Category::Plant,
    Category::Decomposer,
];

/// Advances the world by one simulated year: every species in every category
/// runs die -> reproduce -> eat_random, then the year counter increments.
///
/// The species list is snapshotted per category before processing, so a
/// species driven extinct mid-tick simply no-ops for its remaining steps and
/// one added mid-tick (by the console, between ticks) is picked up next year.
pub fn advance_tick(world: &mut World, rng: &mut impl Rng) {
    for category in TICK_ORDER {
        let rule = FeedingRule::for_category(category);
        for species in world.registry.species_names(category) {
            rule.die(&mut world.registry, &world.environment, &species, rng);
            rule.reproduce(&mut world.registry, &world.environment, &species, rng);
            rule.eat_random(&mut world.registry, &species, rng);
        }
    }
    world.environment.year += 1;
}

/// The background simulation loop: STOPPED until started, then RUNNING until
/// cooperatively stopped. The running flag is polled at the top of each tick;
/// there is no mid-tick cancellation.
pub struct Simulation {
    world: SharedWorld,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    tick_interval: Duration,
}

impl Simulation {
    pub fn new(world: SharedWorld, tick_interval: Duration) -> Self {
        Self {
            world,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            tick_interval,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawns the tick thread. Returns false if the loop was already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.running.store(true, Ordering::SeqCst);

        let world = Arc::clone(&self.world);
        let running = Arc::clone(&self.running);
        let tick_interval = self.tick_interval;
        self.handle = Some(thread::spawn(move || {
            run_loop(world, running, tick_interval);
        }));
        info!("simulation started");
        true
    }

    /// Signals the loop to halt after its current tick and waits for the
    /// thread to finish. Returns false if the loop was not running.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("simulation thread terminated abnormally");
            }
        }
        info!("simulation stopped");
        true
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(world: SharedWorld, running: Arc<AtomicBool>, tick_interval: Duration) {
    let mut rng = rand::thread_rng();
    while running.load(Ordering::SeqCst) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut world = lock_world(&world);
            info!(year = world.environment.year, "processing year");
            advance_tick(&mut world, &mut rng);
        }));
        if let Err(cause) = outcome {
            let cause = cause
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(%cause, "error during simulation, stopping");
            running.store(false, Ordering::SeqCst);
            break;
        }
        thread::sleep(tick_interval);
    }
    info!("simulation loop halted");
}

// A poisoned lock means the other side panicked while holding it; the state
// itself is still usable, so recover the guard rather than propagate.
pub(crate) fn lock_world(world: &SharedWorld) -> MutexGuard<'_, World> {
    match world.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::environment::Environment;
    use crate::species::SpeciesRecord;

    fn populated_world() -> World {
        let mut world = World::new(Environment::new(0, 20, 100, 40));
        let record = SpeciesRecord::new(10_000, 20, 5, 40);
        world.registry.add(Category::Plant, "GRASS", record);
        world.registry.add(Category::Herbivore, "DEER", record);
        world.registry.add(Category::Predator, "WOLF", record);
        world.registry.add(Category::Decomposer, "WORM", record);
        world
    }

    #[test]
    fn advance_tick_increments_year() {
        let mut world = populated_world();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        advance_tick(&mut world, &mut rng);
        assert_eq!(world.environment.year, 1);
        advance_tick(&mut world, &mut rng);
        assert_eq!(world.environment.year, 2);
    }

    #[test]
    fn advance_tick_on_empty_world_only_ages_it() {
        let mut world = World::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        advance_tick(&mut world, &mut rng);
        assert_eq!(world.environment.year, 1);
        assert!(world.registry.is_empty());
    }

    #[test]
    fn populations_never_go_negative_over_many_ticks() {
        let mut world = populated_world();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            advance_tick(&mut world, &mut rng);
            for category in Category::ALL {
                for (name, record) in world.registry.species(category) {
                    assert!(record.count > 0, "{} retained at {}", name, record.count);
                }
            }
        }
    }

    #[test]
    fn start_and_stop_transition_the_state_machine() {
        let world = populated_world().into_shared();
        let mut sim = Simulation::new(Arc::clone(&world), Duration::from_millis(1));

        assert!(!sim.is_running());
        assert!(!sim.stop(), "stop while stopped must report false");

        assert!(sim.start());
        assert!(sim.is_running());
        assert!(!sim.start(), "double start must report false");

        // Give the loop a moment to run at least one tick.
        thread::sleep(Duration::from_millis(50));
        assert!(sim.stop());
        assert!(!sim.is_running());

        let world = lock_world(&world);
        assert!(world.environment.year > 0, "loop never advanced the year");
    }

    #[test]
    fn simulation_can_be_restarted() {
        let world = populated_world().into_shared();
        let mut sim = Simulation::new(Arc::clone(&world), Duration::from_millis(1));

        assert!(sim.start());
        thread::sleep(Duration::from_millis(20));
        assert!(sim.stop());
        let year_after_first_run = lock_world(&world).environment.year;

        assert!(sim.start());
        thread::sleep(Duration::from_millis(20));
        assert!(sim.stop());
        assert!(lock_world(&world).environment.year > year_after_first_run);
    }
}
