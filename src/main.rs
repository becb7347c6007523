use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use terrarium::console::Console;
use terrarium::scenario::Scenario;
use terrarium::simulation::Simulation;
use terrarium::snapshot;
use terrarium::World;

#[derive(Debug, Parser)]
#[command(author, version, about = "Terrarium ecosystem console")]
struct Cli {
    /// Scenario YAML that seeds the initial ecosystem
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Saved ecosystem file to load at startup
    #[arg(long)]
    load: Option<PathBuf>,

    /// Delay between simulation ticks in milliseconds
    #[arg(long, default_value_t = 50)]
    tick_millis: u64,
}

fn main() -> Result<()> {
    // Log to stderr so events do not interleave with console prompts.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut world = match &cli.scenario {
        Some(path) => Scenario::load(path)?.build_world(),
        None => World::default(),
    };
    if let Some(path) = &cli.load {
        snapshot::load(&mut world, path)?;
    }

    let world = world.into_shared();
    let simulation = Simulation::new(world.clone(), Duration::from_millis(cli.tick_millis));

    let stdin = io::stdin();
    let stdout = io::stdout();
    Console::new(stdin.lock(), stdout.lock(), world, simulation).run()?;
    Ok(())
}
