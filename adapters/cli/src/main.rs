#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that scores a hypothetical turn with the combat simulator.
//!
//! Diagnostics go to stderr through `tracing`; stdout carries only the JSON
//! report so the binary can sit at the end of a pipeline.

mod layout_transfer;
mod scenario;

use std::{
    fs::File,
    io::{self, BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lanesim_core::{Catalog, Outcome, Placement, PlacementError};
use lanesim_system_combat::CombatSimulator;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

/// Deterministic action-phase simulator for the diamond lane arena.
#[derive(Debug, Parser)]
#[command(name = "lanesim", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve a scenario and print the outcome as JSON
    Run {
        /// Unit catalog JSON; the built-in catalog is used when omitted
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Scenario JSON holding the board, engine ids and placements
        #[arg(long)]
        scenario: PathBuf,

        /// Board transfer string replacing the scenario's board
        #[arg(long)]
        layout: Option<String>,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Print the scenario's board as a single-line transfer string
    EncodeLayout {
        /// Scenario JSON holding the board to encode
        #[arg(long)]
        scenario: PathBuf,
    },
}

/// JSON document printed by `lanesim run`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    outcome: Outcome,
    rejected: Vec<Rejection>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Rejection {
    index: usize,
    placement: Placement,
    reason: PlacementError,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Run {
            catalog,
            scenario,
            layout,
            pretty,
        } => run(catalog.as_deref(), &scenario, layout.as_deref(), pretty),
        Command::EncodeLayout { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            let encoded = layout_transfer::encode(&scenario.board)?;
            println!("{encoded}");
            Ok(())
        }
    }
}

fn run(
    catalog_path: Option<&Path>,
    scenario_path: &Path,
    layout: Option<&str>,
    pretty: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let scenario = Scenario::load(scenario_path)?;
    let board = match layout {
        Some(layout) => layout_transfer::decode(layout).context("failed to decode --layout")?,
        None => scenario.board.clone(),
    };
    info!(
        structures = board.len(),
        placements = scenario.placements.len(),
        "scenario loaded"
    );

    let mut simulator = CombatSimulator::with_tracked_ids(&catalog, board, &scenario.tracked());
    let rejected: Vec<Rejection> = simulator
        .apply_all(&scenario.placements)
        .into_iter()
        .zip(&scenario.placements)
        .enumerate()
        .filter_map(|(index, (result, placement))| {
            result.err().map(|reason| Rejection {
                index,
                placement: *placement,
                reason,
            })
        })
        .collect();
    for rejection in &rejected {
        warn!(
            index = rejection.index,
            cell = %rejection.placement.cell,
            reason = %rejection.reason,
            "placement rejected"
        );
    }

    let report = Report {
        outcome: simulator.run(),
        rejected,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, &report)?;
    } else {
        serde_json::to_writer(&mut out, &report)?;
    }
    writeln!(out)?;
    Ok(())
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::standard());
    };
    let file =
        File::open(path).with_context(|| format!("failed to open catalog {}", path.display()))?;
    Catalog::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to load catalog {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_line_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_optional_catalog_and_layout() {
        let cli = Cli::try_parse_from([
            "lanesim",
            "run",
            "--scenario",
            "turn.json",
            "--layout",
            "board:v1:W10",
            "--pretty",
        ])
        .expect("arguments parse");

        match cli.command {
            Command::Run {
                catalog,
                scenario,
                layout,
                pretty,
            } => {
                assert!(catalog.is_none());
                assert_eq!(scenario, PathBuf::from("turn.json"));
                assert_eq!(layout.as_deref(), Some("board:v1:W10"));
                assert!(pretty);
            }
            Command::EncodeLayout { .. } => panic!("expected the run subcommand"),
        }
    }

    #[test]
    fn run_requires_a_scenario() {
        assert!(Cli::try_parse_from(["lanesim", "run"]).is_err());
    }
}
