//! Headless run of the ball pit: fixed number of ticks, no window.
//!
//! Usage: `benchmark [TICKS] [BODIES] [--dump]`
//! `--dump` prints the final snapshot as JSON.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use ball_pit::config::SimConfig;
use ball_pit::physics::{ContainerBounds, Simulator};

const DEFAULT_TICKS: usize = 10_000;
const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;

#[derive(Parser, Debug)]
#[command(about = "Run the ball pit headless and time the ticks")]
struct Args {
    /// Number of fixed ticks to run
    #[arg(default_value_t = DEFAULT_TICKS)]
    ticks: usize,
    /// Balls to spawn (defaults to the configured maximum)
    bodies: Option<usize>,
    /// Print the final snapshot as JSON
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = SimConfig {
        seed: Some(1),
        ..Default::default()
    };
    let bodies = args.bodies.unwrap_or(config.max_bodies);

    let mut sim = Simulator::new(config, ContainerBounds::new(WIDTH, HEIGHT))
        .context("benchmark config rejected")?;
    sim.reset_hard(bodies);

    let mut contacts = 0usize;
    let start = Instant::now();
    for _ in 0..args.ticks {
        contacts += sim.tick().contacts;
    }
    let elapsed = start.elapsed();

    println!(
        "{} bodies, {} ticks in {:.3?} ({:.2} µs/tick), {} contacts, final KE {:.3}",
        sim.len(),
        args.ticks,
        elapsed,
        elapsed.as_secs_f64() * 1e6 / args.ticks.max(1) as f64,
        contacts,
        sim.kinetic_energy(),
    );

    if args.dump {
        println!("{}", serde_json::to_string_pretty(&sim.snapshot())?);
    }
    Ok(())
}
