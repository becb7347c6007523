//! Line-oriented save/load of the whole world state.
//!
//! Layout: four header lines (year, temperature, accessible water, humidity)
//! followed by one `CATEGORY,SPECIES,count,comfortTemp,consumedWater,
//! comfortHumidity` line per species. Lines starting with `//` are comments
//! and never consume a position.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::environment::Environment;
use crate::registry::Category;
use crate::species::SpeciesRecord;
use crate::world::World;

/// Species lines are written grouped in this order.
const SAVE_ORDER: [Category; 4] = [
    Category::Plant,
    Category::Herbivore,
    Category::Predator,
    Category::Decomposer,
];

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: malformed number {value:?}")]
    MalformedNumber { line: usize, value: String },

    #[error("missing header lines: expected year, temperature, water and humidity")]
    TruncatedHeader,
}

impl SnapshotError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Writes the world to `path` in the line format above, preceded by a
/// timestamp comment the loader will skip.
pub fn save(world: &World, path: &Path) -> Result<(), SnapshotError> {
    let file = File::create(path).map_err(|e| SnapshotError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_world(world, &mut writer).map_err(|e| SnapshotError::io(path, e))?;
    writer.flush().map_err(|e| SnapshotError::io(path, e))?;
    info!(path = %path.display(), "ecosystem saved");
    Ok(())
}

fn write_world(world: &World, writer: &mut impl Write) -> std::io::Result<()> {
    let env = &world.environment;
    writeln!(
        writer,
        "// saved {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(writer, "{}", env.year)?;
    writeln!(writer, "{}", env.temperature)?;
    writeln!(writer, "{}", env.accessible_water)?;
    writeln!(writer, "{}", env.humidity)?;
    for category in SAVE_ORDER {
        for (name, record) in world.registry.species(category) {
            writeln!(
                writer,
                "{},{},{},{},{},{}",
                category,
                name,
                record.count,
                record.comfort_temperature,
                record.water_per_individual,
                record.comfort_humidity
            )?;
        }
    }
    Ok(())
}

/// Reads a saved ecosystem from `path` and applies it to `world`: header
/// fields overwrite the environment, species records merge into the registry
/// (existing species of the same name are overwritten, others are kept).
///
/// The whole file is parsed before anything is applied, so a load that fails
/// leaves the world untouched. Species lines with an unrecognized category or
/// too few fields are skipped with a warning; malformed numbers abort.
pub fn load(world: &mut World, path: &Path) -> Result<(), SnapshotError> {
    let contents = fs::read_to_string(path).map_err(|e| SnapshotError::io(path, e))?;
    let parsed = parse(&contents)?;

    world.environment = parsed.environment;
    for (category, name, record) in parsed.species {
        world.registry.add(category, &name, record);
    }
    info!(path = %path.display(), "ecosystem loaded");
    Ok(())
}

struct Parsed {
    environment: Environment,
    species: Vec<(Category, String, SpeciesRecord)>,
}

fn parse(contents: &str) -> Result<Parsed, SnapshotError> {
    let mut header = [0i64; 4];
    let mut species = Vec::new();
    // Position among non-comment lines; the first four are the header.
    let mut position = 0usize;

    for (index, raw) in contents.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        if line.starts_with("//") {
            continue;
        }

        if position < 4 {
            header[position] = parse_number(line, line_number)?;
        } else {
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < 6 {
                warn!(line = line_number, "invalid record, expected at least 6 fields");
                position += 1;
                continue;
            }
            let category = match fields[0].parse::<Category>() {
                Ok(category) => category,
                Err(err) => {
                    warn!(line = line_number, %err, "skipping species record");
                    position += 1;
                    continue;
                }
            };
            let name = fields[1].trim().to_uppercase();
            let record = SpeciesRecord::new(
                parse_number(fields[2], line_number)?,
                parse_number(fields[3], line_number)? as i32,
                parse_number(fields[4], line_number)? as i32,
                parse_number(fields[5], line_number)? as i32,
            );
            species.push((category, name, record));
        }
        position += 1;
    }

    if position < 4 {
        return Err(SnapshotError::TruncatedHeader);
    }

    Ok(Parsed {
        environment: Environment::new(
            header[0],
            header[1] as i32,
            header[2] as i32,
            header[3] as i32,
        ),
        species,
    })
}

fn parse_number(value: &str, line: usize) -> Result<i64, SnapshotError> {
    value
        .trim()
        .parse()
        .map_err(|_| SnapshotError::MalformedNumber {
            line,
            value: value.trim().to_string(),
        })
}
