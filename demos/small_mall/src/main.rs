//! small_mall: end-to-end run of the mall shopper simulation.
//!
//! Builds an eight-unit floor, creates a population that trickles in over the
//! first two hours, and runs a twelve-hour day at one minute per tick.  Set
//! `MALL_CONFIG` to a TOML file to override the built-in settings, and
//! `RUST_LOG` (e.g. `RUST_LOG=debug`) to see individual moves.

mod floor;

use std::time::Instant;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use mall_core::{LocationId, Tick};
use mall_sim::{MallConfig, SimBuilder, SimObserver, TickSummary};
use mall_spatial::{MatrixEnvironment, MoveNotice};

use floor::build_floor;

// ── Defaults ──────────────────────────────────────────────────────────────────

const SHOPPERS:          usize = 400;
const SEED:              u64   = 42;
const REPORT_EVERY:      u64   = 60; // ticks
const ARRIVAL_WINDOW:    u64   = 120;

// ── Observer ──────────────────────────────────────────────────────────────────

/// Logs an hourly summary and counts entries into each location.
struct Footfall {
    visits:  Vec<u64>,
    peak:    usize,
    peak_at: Tick,
}

impl Footfall {
    fn new(locations: usize) -> Self {
        Self { visits: vec![0; locations], peak: 0, peak_at: Tick::ZERO }
    }
}

impl SimObserver<MatrixEnvironment> for Footfall {
    fn on_move(&mut self, _tick: Tick, notice: &MoveNotice) {
        if let Some(to) = notice.to {
            self.visits[to.index()] += 1;
        }
    }

    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        if summary.active > self.peak {
            self.peak = summary.active;
            self.peak_at = tick;
        }
    }

    fn on_snapshot(&mut self, tick: Tick, _shoppers: &[mall_agent::Shopper], env: &MatrixEnvironment) {
        tracing::info!(%tick, present = env.total_present(), moves = env.moves_notified(), "hourly report");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Configuration: file if given, built-in otherwise.
    let config = match std::env::var_os("MALL_CONFIG") {
        Some(path) => MallConfig::load(&path)
            .with_context(|| format!("loading {}", path.to_string_lossy()))?,
        None => {
            let mut c = MallConfig::default();
            c.sim.seed = SEED;
            c.sim.snapshot_interval_ticks = REPORT_EVERY;
            c.population.count = SHOPPERS;
            c.population.arrival_window_ticks = ARRIVAL_WINDOW;
            c.validate()?;
            c
        }
    };

    // 2. Floor plan.
    let env = build_floor().context("building floor")?;
    println!("Floor: {} locations", env.len());

    // 3. Population and model.
    let (shoppers, rngs) = config.population_builder().build()?;
    let model = config.model()?;
    println!(
        "Shoppers: {}  |  Ticks: {} × {} min  |  Seed: {}",
        shoppers.len(),
        config.sim.total_ticks,
        config.sim.minutes_per_iteration,
        config.sim.seed
    );
    println!();

    // 4. Run.
    let mut sim = SimBuilder::new(config.sim.clone(), shoppers, rngs, env, model).build()?;
    let mut footfall = Footfall::new(sim.env.len());
    let t0 = Instant::now();
    sim.run(&mut footfall)?;
    let elapsed = t0.elapsed();

    // 5. Summary.
    let totals = sim.totals();
    println!("Simulation complete in {:.3} s at {}", elapsed.as_secs_f64(), sim.clock);
    println!("  ticks      : {}", totals.ticks);
    println!("  moves      : {}", totals.moves);
    println!("  departures : {}", totals.departures);
    println!("  peak       : {} shoppers at {}", footfall.peak, footfall.peak_at);
    println!();

    println!("{:<16} {:>8} {:>8}", "Location", "Entries", "Now");
    println!("{}", "-".repeat(34));
    for (i, visits) in footfall.visits.iter().enumerate() {
        let id = LocationId(i as u32);
        let name = sim.env.location(id).map_or("?", |l| l.name.as_str());
        println!("{:<16} {:>8} {:>8}", name, visits, sim.env.occupancy(id));
    }

    Ok(())
}
