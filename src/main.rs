// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tessera CLI entrypoint.
//!
//! `renumber` rewrites every configured puzzle into the output root, `plan` prints the row layout
//! of a single puzzle folder, and `check` validates the adjacency files of a renumbered root.

use std::error::Error;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing::Level;

use tessera::batch::{
    plan_folder, run_batch, BatchConfig, PuzzleKey, PuzzleOutcome, PuzzleSelection,
    DEFAULT_OUTPUT_DIR, DEFAULT_PUZZLE_NAMES, DEFAULT_SIZES,
};
use tessera::check::{check_root, CheckOutcome};
use tessera::layout::{RowTolerance, TolerancePolicy};
use tessera::store::{PuzzleFolder, WriteDurability};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Renumber jigsaw puzzle pieces in row-major order")]
#[command(version)]
struct Cli {
    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Renumber puzzles from ROOT into the output root
    Renumber {
        /// Folder holding the `<name>_<size>` puzzle folders
        #[arg(env = "TESSERA_ROOT", default_value = ".")]
        root: PathBuf,

        /// Output root
        #[arg(long, env = "TESSERA_OUT", default_value = DEFAULT_OUTPUT_DIR)]
        out: PathBuf,

        #[command(flatten)]
        puzzles: PuzzleArgs,

        /// Process every `<name>_<size>` folder under ROOT instead of the known names
        #[arg(long, conflicts_with = "names")]
        discover: bool,

        /// Flush written files to stable storage (slower)
        #[arg(long)]
        durable_writes: bool,

        /// Print the batch report as json
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        tolerance: ToleranceArgs,
    },
    /// Print tolerances and the row layout of one puzzle folder
    Plan {
        puzzle_dir: PathBuf,

        #[command(flatten)]
        tolerance: ToleranceArgs,
    },
    /// Check the adjacency files of a renumbered root
    Check {
        #[arg(env = "TESSERA_OUT", default_value = DEFAULT_OUTPUT_DIR)]
        root: PathBuf,

        #[command(flatten)]
        puzzles: PuzzleArgs,
    },
}

#[derive(Args)]
struct PuzzleArgs {
    /// Puzzle name (repeatable; defaults to the known puzzle set)
    #[arg(long = "name", value_name = "NAME")]
    names: Vec<String>,

    /// Piece count (repeatable; defaults to 10, 100 and 500)
    #[arg(long = "size", value_name = "SIZE")]
    sizes: Vec<u32>,
}

impl PuzzleArgs {
    fn names(&self) -> Vec<String> {
        if self.names.is_empty() {
            DEFAULT_PUZZLE_NAMES.iter().map(|name| (*name).to_owned()).collect()
        } else {
            self.names.clone()
        }
    }

    fn sizes(&self) -> Vec<u32> {
        if self.sizes.is_empty() {
            DEFAULT_SIZES.to_vec()
        } else {
            self.sizes.clone()
        }
    }
}

#[derive(Args)]
struct ToleranceArgs {
    /// Lower bound for the row tolerance
    #[arg(long, value_name = "PX")]
    row_tolerance_floor: Option<f64>,

    /// Fraction of the median piece height used as row tolerance
    #[arg(long, value_name = "FACTOR")]
    row_tolerance_factor: Option<f64>,

    /// Multiplier from row tolerance to merge tolerance
    #[arg(long, value_name = "FACTOR")]
    merge_factor: Option<f64>,
}

impl ToleranceArgs {
    fn policy(&self) -> TolerancePolicy {
        let defaults = TolerancePolicy::default();
        TolerancePolicy {
            floor: self.row_tolerance_floor.unwrap_or(defaults.floor),
            height_factor: self.row_tolerance_factor.unwrap_or(defaults.height_factor),
            merge_factor: self.merge_factor.unwrap_or(defaults.merge_factor),
        }
    }
}

#[derive(Serialize)]
struct PlanJson<'a> {
    puzzle: String,
    tolerance: &'a RowTolerance,
    clustered_rows: usize,
    merges: usize,
    merge_passes: usize,
    rows: Vec<Vec<PlanCellJson>>,
}

#[derive(Serialize)]
struct PlanCellJson {
    new_id: usize,
    old_id: i64,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

fn renumber(config: &BatchConfig, json: bool) -> Result<bool, Box<dyn Error>> {
    let report = run_batch(config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report.to_json()?)?);
        return Ok(report.failed() == 0);
    }

    for result in &report.results {
        match &result.outcome {
            PuzzleOutcome::Processed(summary) => println!(
                "processed {}: {} pieces in {} rows {:?}",
                result.key, summary.pieces, summary.rows, summary.row_lengths
            ),
            PuzzleOutcome::Skipped => println!("skipped {}: folder not found", result.key),
            PuzzleOutcome::Failed(failure) => println!("failed {failure}"),
        }
    }
    println!(
        "processed: {}, skipped: {}, failed: {}",
        report.processed(),
        report.skipped(),
        report.failed()
    );

    Ok(report.failed() == 0)
}

fn plan(puzzle_dir: PathBuf, policy: &TolerancePolicy) -> Result<bool, Box<dyn Error>> {
    let folder = PuzzleFolder::new(puzzle_dir);
    let (_, plan) = plan_folder(&folder, policy)?;

    let mut next = 0usize;
    let rows: Vec<Vec<PlanCellJson>> = plan
        .grid()
        .rows()
        .iter()
        .map(|row| {
            row.ids()
                .map(|old| {
                    let cell = PlanCellJson {
                        new_id: next,
                        old_id: old.get(),
                    };
                    next += 1;
                    cell
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let doc = PlanJson {
        puzzle: folder.root().display().to_string(),
        tolerance: plan.tolerance(),
        clustered_rows: plan.clustered_rows(),
        merges: plan.merges(),
        merge_passes: plan.merge_passes(),
        rows,
    };
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(true)
}

fn check(root: PathBuf, puzzles: &PuzzleArgs) -> Result<bool, Box<dyn Error>> {
    let names = puzzles.names();
    let sizes = puzzles.sizes();
    let accept =
        |key: &PuzzleKey| names.iter().any(|n| n == key.name()) && sizes.contains(&key.size());
    let report = check_root(&root, accept)?;

    for puzzle in &report.puzzles {
        match &puzzle.outcome {
            CheckOutcome::Consistent => println!("ok {}: graph is consistent", puzzle.key),
            CheckOutcome::MissingAdjacency => println!("error {}: adjacent.json missing", puzzle.key),
            CheckOutcome::Invalid(err) => println!("error {}: {err}", puzzle.key),
            CheckOutcome::Issues(issues) => {
                println!("error {}: {} issue(s)", puzzle.key, issues.len());
                for issue in issues {
                    println!("  - {issue}");
                }
            }
        }
    }
    println!("puzzles checked: {}", report.puzzles_checked());
    println!("total errors: {}", report.total_errors());

    Ok(report.total_errors() == 0)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = (|| -> Result<bool, Box<dyn Error>> {
        match cli.command {
            Commands::Renumber {
                root,
                out,
                puzzles,
                discover,
                durable_writes,
                json,
                tolerance,
            } => {
                let config = BatchConfig {
                    source_root: root,
                    output_root: out,
                    selection: if discover {
                        PuzzleSelection::Discover
                    } else {
                        PuzzleSelection::Named(puzzles.names())
                    },
                    sizes: puzzles.sizes(),
                    policy: tolerance.policy(),
                    durability: if durable_writes {
                        WriteDurability::Durable
                    } else {
                        WriteDurability::BestEffort
                    },
                };
                renumber(&config, json)
            }
            Commands::Plan {
                puzzle_dir,
                tolerance,
            } => plan(puzzle_dir, &tolerance.policy()),
            Commands::Check { root, puzzles } => check(root, &puzzles),
        }
    })();

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
