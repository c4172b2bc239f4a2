//! Headless encounter runner for the Skirmish tactics core.
//!
//! Loads an encounter from YAML, runs it at a fixed timestep until the
//! outro has played, and logs every published event.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `skirmish-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Build the encounter and spawn its participants
//! 4. Attach the event journal
//! 5. Tick until the encounter finishes or the tick budget runs out
//! 6. Log the result

mod error;
mod journal;

use std::path::PathBuf;

use skirmish_core::{CombatManager, EncounterConfig};
use skirmish_types::Controller;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::journal::Journal;

/// Seconds simulated per tick.
const TICK_SECONDS: f64 = 0.05;

/// Ticks allowed before the run is abandoned.
const MAX_TICKS: u64 = 200_000;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "skirmish-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the encounter
/// cannot be built, or it does not finish within [`MAX_TICKS`].
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
    info!(
        encounter = %config.encounter.name,
        seed = config.encounter.seed,
        width = config.grid.width,
        height = config.grid.height,
        participants = config.participants.len(),
        "Configuration loaded"
    );

    if config.participants.is_empty() {
        warn!("No participants configured; nothing to simulate");
        return Ok(());
    }
    let humans = config
        .participants
        .iter()
        .filter(|p| p.controller == Controller::Human)
        .count();
    if humans > 0 {
        warn!(humans, "Headless run: human turns will be ended immediately");
    }

    // 3. Build the encounter.
    let mut manager = CombatManager::new(&config).map_err(EngineError::from)?;

    // 4. Attach the journal.
    let journal = Journal::attach(manager.bus());

    // 5. Run.
    let ticks = run(&mut manager)?;

    // 6. Report.
    let counts = journal.detach();
    info!(
        ticks,
        elapsed_seconds = manager.clock().elapsed(),
        winner = ?manager.winner(),
        events = counts.values().sum::<u64>(),
        "Encounter finished"
    );
    for (kind, count) in &counts {
        info!(?kind, count, "Event total");
    }
    Ok(())
}

/// Tick `manager` until it finishes. Human token holders are passed over.
fn run(manager: &mut CombatManager) -> Result<u64, EngineError> {
    let mut ticks: u64 = 0;
    while !manager.is_finished() {
        if ticks >= MAX_TICKS {
            return Err(EngineError::TickLimit { ticks });
        }
        if manager.awaiting_input().is_some() {
            manager.end_turn();
        }
        manager.update(TICK_SECONDS)?;
        ticks = ticks.saturating_add(1);
    }
    Ok(ticks)
}

/// Load the encounter from the path in the first argument, from
/// `skirmish-config.yaml`, or fall back to defaults.
fn load_config() -> Result<EncounterConfig, EngineError> {
    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    if path.exists() {
        Ok(EncounterConfig::from_file(&path)?)
    } else {
        // Logging is not up yet.
        eprintln!("{} not found, using defaults", path.display());
        Ok(EncounterConfig::parse("")?)
    }
}
