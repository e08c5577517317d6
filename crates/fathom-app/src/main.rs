//! FATHOM_OS console entry point.
//!
//! Drives the session orchestrator from stdin. The virtual clock advances
//! with wall-clock time between lines, so scripted screens play out while
//! the operator reads them; `tick` and `wait` move it forward on demand.
//! In recovery mode every line goes to the recovery console.

mod commands;
mod render;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use commands::ConsoleCommand;
use fathom_core::config::FathomConfig;
use fathom_core::store::JsonFileStore;
use fathom_core::{Mode, SessionOrchestrator};

const DEFAULT_CONFIG: &str = "fathom.toml";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Resolve config from CLI arg, FATHOM_CONFIG env var, or the default.
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FATHOM_CONFIG").ok())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    let config = FathomConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    log::info!("Starting FATHOM_OS for {}", config.facility_name);

    let store = JsonFileStore::open(&config.store_path)
        .with_context(|| format!("opening store {}", config.store_path.display()))?;
    let mut orch = SessionOrchestrator::from_config(config, Box::new(store));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut last = Instant::now();
    print_lines(&mut stdout, &render::render(&orch))?;

    for line in stdin.lock().lines() {
        let line = line?;
        let elapsed = u64::try_from(last.elapsed().as_millis()).unwrap_or(u64::MAX);
        last = Instant::now();
        orch.tick(elapsed);

        let output = if orch.mode() == Mode::RecoveryMode && line.trim() != "quit" {
            orch.recovery_command(&line)
        } else {
            match commands::parse(&line) {
                Ok(Some(ConsoleCommand::Quit)) => break,
                Ok(Some(cmd)) => commands::apply(cmd, &mut orch),
                Ok(None) => Vec::new(),
                Err(e) => vec![e.to_string()],
            }
        };
        print_lines(&mut stdout, &output)?;
        print_lines(&mut stdout, &render::render(&orch))?;
    }

    log::info!("Console closed");
    Ok(())
}

fn print_lines(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for l in lines {
        writeln!(out, "{l}")?;
    }
    out.flush()
}
