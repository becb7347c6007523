//! The operator-facing command loop. Everything here talks to the shared
//! world under its lock and to the background loop through [`Simulation`];
//! operator messages go to the console writer, diagnostics to tracing.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use tracing::{info, warn};

use crate::demography::{
    decomposer_survival_chance, herbivore_survival_chance, plant_survival_chance,
    predator_survival_chance,
};
use crate::registry::Category;
use crate::simulation::{lock_world, Simulation};
use crate::snapshot;
use crate::species::SpeciesRecord;
use crate::world::SharedWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Add,
    Change,
    Display,
    Save,
    Load,
    Exit,
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "add" => Ok(Command::Add),
            "change" => Ok(Command::Change),
            "display" => Ok(Command::Display),
            "save" => Ok(Command::Save),
            "load" => Ok(Command::Load),
            "exit" => Ok(Command::Exit),
            _ => Err(()),
        }
    }
}

pub struct Console<R, W> {
    input: R,
    output: W,
    world: SharedWorld,
    simulation: Simulation,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, world: SharedWorld, simulation: Simulation) -> Self {
        Self {
            input,
            output,
            world,
            simulation,
        }
    }

    /// Runs until `exit` (or end of input, which is treated the same).
    pub fn run(&mut self) -> io::Result<()> {
        info!("simulation console started");
        loop {
            writeln!(
                self.output,
                "\nAvailable commands: start, stop, add, change, display, save, load, exit"
            )?;
            let line = match self.prompt("Enter command: ")? {
                Some(line) => line,
                None => break,
            };
            if line.is_empty() {
                continue;
            }

            match line.parse::<Command>() {
                Ok(Command::Start) => self.start()?,
                Ok(Command::Stop) => self.stop()?,
                Ok(Command::Add) => self.add_creature()?,
                Ok(Command::Change) => self.change_conditions()?,
                Ok(Command::Display) => self.display()?,
                Ok(Command::Save) => self.save()?,
                Ok(Command::Load) => self.load()?,
                Ok(Command::Exit) => break,
                Err(()) => {
                    writeln!(self.output, "Unknown command: {}", line)?;
                    warn!(command = %line, "unknown command");
                }
            }
        }
        self.simulation.stop();
        info!("exiting the simulation");
        Ok(())
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompts for one number; a parse failure reports to the operator and
    /// yields None so the caller can abandon the operation.
    fn prompt_number(&mut self, label: &str) -> io::Result<Option<i64>> {
        let line = match self.prompt(label)? {
            Some(line) => line,
            None => return Ok(None),
        };
        match line.parse::<i64>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                writeln!(self.output, "Invalid input! Please enter valid numbers.")?;
                warn!(value = %line, "invalid number from operator");
                Ok(None)
            }
        }
    }

    fn start(&mut self) -> io::Result<()> {
        if self.simulation.start() {
            writeln!(self.output, "Simulation started.")
        } else {
            writeln!(self.output, "Simulation is already running.")
        }
    }

    fn stop(&mut self) -> io::Result<()> {
        if self.simulation.stop() {
            writeln!(self.output, "Simulation stopped.")
        } else {
            writeln!(self.output, "Simulation is not running.")
        }
    }

    fn add_creature(&mut self) -> io::Result<()> {
        let category_input =
            match self.prompt("Enter category (PLANT, HERBIVORE, PREDATOR, DECOMPOSER): ")? {
                Some(line) => line,
                None => return Ok(()),
            };
        let category = match category_input.parse::<Category>() {
            Ok(category) => category,
            Err(err) => {
                writeln!(self.output, "{}", err)?;
                warn!(%err, "rejected creature");
                return Ok(());
            }
        };
        let species = match self.prompt("Enter species name: ")? {
            Some(line) if !line.is_empty() => line,
            _ => return Ok(()),
        };
        let Some(count) = self.prompt_number("Enter population count: ")? else {
            return Ok(());
        };
        let Some(comfort_temperature) = self.prompt_number("Enter comfort temperature: ")? else {
            return Ok(());
        };
        let Some(water) = self.prompt_number("Enter consumed water per individual: ")? else {
            return Ok(());
        };
        let Some(humidity) = self.prompt_number("Enter comfort humidity percentage: ")? else {
            return Ok(());
        };

        let record =
            SpeciesRecord::new(count, comfort_temperature as i32, water as i32, humidity as i32);
        lock_world(&self.world)
            .registry
            .add(category, &species, record);
        writeln!(self.output, "Creature added successfully.")?;
        info!(category = %category, species = %species, count, "creature added");
        Ok(())
    }

    fn change_conditions(&mut self) -> io::Result<()> {
        let Some(temperature) = self.prompt_number("Enter new temperature: ")? else {
            return Ok(());
        };
        let Some(water) = self.prompt_number("Enter accessible water: ")? else {
            return Ok(());
        };
        let Some(humidity) = self.prompt_number("Enter humidity percentage: ")? else {
            return Ok(());
        };

        {
            let mut world = lock_world(&self.world);
            world.environment.temperature = temperature as i32;
            world.environment.accessible_water = water as i32;
            world.environment.humidity = humidity as i32;
        }
        writeln!(self.output, "World conditions updated.")?;
        info!(temperature, water, humidity, "world conditions updated");
        Ok(())
    }

    fn display(&mut self) -> io::Result<()> {
        let world = lock_world(&self.world);
        let env = world.environment;
        let totals = world.totals();

        writeln!(self.output, "Current year: {}", env.year)?;
        writeln!(self.output, "Current temperature: {}", env.temperature)?;
        writeln!(self.output, "Current accessible water: {}", env.accessible_water)?;
        writeln!(self.output, "Current humidity percentage: {}", env.humidity)?;
        writeln!(self.output, "Total plants: {}", totals.plants)?;
        writeln!(self.output, "Total herbivores: {}", totals.herbivores)?;
        writeln!(self.output, "Total predators: {}", totals.predators)?;
        writeln!(self.output, "Total decomposers: {}", totals.decomposers)?;

        for category in [
            Category::Predator,
            Category::Herbivore,
            Category::Plant,
            Category::Decomposer,
        ] {
            for (name, record) in world.registry.species(category) {
                let chance = match category {
                    Category::Plant => plant_survival_chance(record, totals, &env),
                    Category::Herbivore => herbivore_survival_chance(record, totals, &env),
                    Category::Predator => predator_survival_chance(record, totals, &env),
                    Category::Decomposer => decomposer_survival_chance(record, totals, &env),
                };
                writeln!(
                    self.output,
                    "{}: {} -> {}; survival coefficient: {}",
                    category, name, record.count, chance
                )?;
            }
        }
        Ok(())
    }

    fn save(&mut self) -> io::Result<()> {
        let path = match self.prompt("Enter file path to save: ")? {
            Some(line) if !line.is_empty() => line,
            _ => return Ok(()),
        };
        let world = lock_world(&self.world);
        match snapshot::save(&world, Path::new(&path)) {
            Ok(()) => writeln!(self.output, "Ecosystem saved successfully to {}", path),
            Err(err) => {
                warn!(%err, "save failed");
                writeln!(self.output, "Error saving to file: {}", err)
            }
        }
    }

    fn load(&mut self) -> io::Result<()> {
        let path = match self.prompt("Enter file path to load: ")? {
            Some(line) if !line.is_empty() => line,
            _ => return Ok(()),
        };
        let mut world = lock_world(&self.world);
        match snapshot::load(&mut world, Path::new(&path)) {
            Ok(()) => writeln!(self.output, "Ecosystem loaded successfully from {}", path),
            Err(err) => {
                warn!(%err, "load failed");
                writeln!(self.output, "Error loading file: {}", err)
            }
        }
    }
}
