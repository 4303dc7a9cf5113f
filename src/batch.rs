// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Renumbering many puzzles at many sizes.
//!
//! Every `<name>_<size>` folder is processed on its own; a failure is recorded against that
//! puzzle and the batch moves on. The report is assembled from per-puzzle results.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::layout::{plan_puzzle, LayoutError, PuzzlePlan, TolerancePolicy};
use crate::store::{LoadedPuzzle, PuzzleFolder, StoreError, WriteDurability};

pub const DEFAULT_PUZZLE_NAMES: [&str; 18] = [
    "barn",
    "bunny",
    "carwash",
    "cats",
    "classiccar",
    "cobblestone",
    "fiftiestown",
    "fruitpainting",
    "goldengate",
    "hobbithole",
    "japan",
    "macaroon",
    "oceanpainting",
    "pinkflower",
    "puppies",
    "stockholm",
    "tajmahal",
    "venice",
];

pub const DEFAULT_SIZES: [u32; 3] = [10, 100, 500];

pub const DEFAULT_OUTPUT_DIR: &str = "Renumbered";

fn puzzle_folder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(.+)_(\d+)$").ok())
        .as_ref()
}

/// `<name>_<size>`: one puzzle at one piece count.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PuzzleKey {
    name: String,
    size: u32,
}

impl PuzzleKey {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Splits a folder name on its last `_`. The size must be a decimal integer.
    pub fn parse(folder_name: &str) -> Option<Self> {
        let caps = puzzle_folder_pattern()?.captures(folder_name)?;
        let size = caps.get(2)?.as_str().parse().ok()?;
        Some(Self::new(caps.get(1)?.as_str(), size))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn folder_name(&self) -> String {
        format!("{}_{}", self.name, self.size)
    }

    /// A configured name crossed with a size. The name must form a single path component that
    /// reads back as the same key, so the folder stays directly under its root.
    fn checked(name: &str, size: u32) -> Result<Self, BatchError> {
        let key = Self::new(name, size);
        let folder_name = key.folder_name();
        let mut components = Path::new(&folder_name).components();
        let single = matches!(
            components.next(),
            Some(Component::Normal(part)) if part == folder_name.as_str()
        ) && components.next().is_none();
        let round_trips = Self::parse(&folder_name).as_ref() == Some(&key);
        if !single || !round_trips || name.contains(['/', '\\']) {
            return Err(BatchError::InvalidPuzzleName {
                name: name.to_owned(),
            });
        }
        Ok(key)
    }
}

impl fmt::Display for PuzzleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.name, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleSelection {
    /// Every name crossed with every configured size.
    Named(Vec<String>),
    /// Every `<name>_<size>` folder found under the source root whose size is configured.
    Discover,
}

impl Default for PuzzleSelection {
    fn default() -> Self {
        Self::Named(DEFAULT_PUZZLE_NAMES.iter().map(|name| (*name).to_owned()).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub selection: PuzzleSelection,
    pub sizes: Vec<u32>,
    pub policy: TolerancePolicy,
    pub durability: WriteDurability,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("."),
            output_root: PathBuf::from(DEFAULT_OUTPUT_DIR),
            selection: PuzzleSelection::default(),
            sizes: DEFAULT_SIZES.to_vec(),
            policy: TolerancePolicy::default(),
            durability: WriteDurability::default(),
        }
    }
}

impl BatchConfig {
    /// The puzzles this batch covers, sorted and without duplicates.
    pub fn puzzle_keys(&self) -> Result<Vec<PuzzleKey>, BatchError> {
        let mut keys = match &self.selection {
            PuzzleSelection::Named(names) => names
                .iter()
                .flat_map(|name| self.sizes.iter().map(|&size| PuzzleKey::checked(name, size)))
                .collect::<Result<Vec<_>, _>>()?,
            PuzzleSelection::Discover => discover_puzzles(&self.source_root)?
                .into_iter()
                .filter(|key| self.sizes.contains(&key.size))
                .collect(),
        };
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}

/// Puzzle folders directly under `root`, in no particular order.
pub fn discover_puzzles(root: &Path) -> Result<Vec<PuzzleKey>, BatchError> {
    let io_err = |source| BatchError::Io {
        path: root.to_path_buf(),
        source,
    };
    let mut keys = Vec::new();
    for entry in fs::read_dir(root).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(key) = entry.file_name().to_str().and_then(PuzzleKey::parse) {
            keys.push(key);
        }
    }
    Ok(keys)
}

#[derive(Debug)]
pub enum BatchError {
    Io { path: PathBuf, source: io::Error },
    InvalidPuzzleName { name: String },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot list puzzles in {path:?}: {source}"),
            Self::InvalidPuzzleName { name } => {
                write!(f, "puzzle name {name:?} is not a plain folder name")
            }
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidPuzzleName { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Layout,
    Rewrite,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::Layout => "layout",
            Self::Rewrite => "rewrite",
        })
    }
}

#[derive(Debug)]
pub enum PuzzleError {
    Load(StoreError),
    Layout(LayoutError),
    Rewrite(StoreError),
}

impl PuzzleError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Load(_) => Stage::Load,
            Self::Layout(_) => Stage::Layout,
            Self::Rewrite(_) => Stage::Rewrite,
        }
    }
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(err) | Self::Rewrite(err) => write!(f, "{}: {err}", self.stage()),
            Self::Layout(err) => write!(f, "{}: {err}", self.stage()),
        }
    }
}

impl std::error::Error for PuzzleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(err) | Self::Rewrite(err) => Some(err),
            Self::Layout(err) => Some(err),
        }
    }
}

#[derive(Debug)]
pub struct PuzzleFailure {
    pub key: PuzzleKey,
    pub error: PuzzleError,
}

impl PuzzleFailure {
    pub fn stage(&self) -> Stage {
        self.error.stage()
    }
}

impl fmt::Display for PuzzleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed during {}", self.key, self.error)
    }
}

impl std::error::Error for PuzzleFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PuzzleSummary {
    pub pieces: usize,
    pub rows: usize,
    pub row_lengths: Vec<usize>,
    pub median_height: f64,
    pub row_tolerance: f64,
    pub merge_tolerance: f64,
    pub clustered_rows: usize,
    pub merges: usize,
    pub renamed_assets: usize,
    pub copied_assets: usize,
}

impl PuzzleSummary {
    fn from_plan(plan: &PuzzlePlan) -> Self {
        let grid = plan.grid();
        let tolerance = plan.tolerance();
        Self {
            pieces: grid.piece_count(),
            rows: grid.row_count(),
            row_lengths: grid.row_lengths(),
            median_height: tolerance.median_height,
            row_tolerance: tolerance.row,
            merge_tolerance: tolerance.merge,
            clustered_rows: plan.clustered_rows(),
            merges: plan.merges(),
            renamed_assets: 0,
            copied_assets: 0,
        }
    }
}

#[derive(Debug)]
pub enum PuzzleOutcome {
    Processed(PuzzleSummary),
    Skipped,
    Failed(PuzzleFailure),
}

#[derive(Debug)]
pub struct PuzzleResult {
    pub key: PuzzleKey,
    pub outcome: PuzzleOutcome,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<PuzzleResult>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.count(|outcome| matches!(outcome, PuzzleOutcome::Processed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, PuzzleOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, PuzzleOutcome::Failed(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = &PuzzleFailure> + '_ {
        self.results.iter().filter_map(|result| match &result.outcome {
            PuzzleOutcome::Failed(failure) => Some(failure),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&PuzzleOutcome) -> bool) -> usize {
        self.results.iter().filter(|result| pred(&result.outcome)).count()
    }

    /// The report as a json document: totals plus one entry per puzzle in key order.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        let puzzles = self
            .results
            .iter()
            .map(|result| {
                let mut entry = PuzzleResultJson {
                    key: &result.key,
                    status: "processed",
                    summary: None,
                    stage: None,
                    error: None,
                };
                match &result.outcome {
                    PuzzleOutcome::Processed(summary) => entry.summary = Some(summary),
                    PuzzleOutcome::Skipped => entry.status = "skipped",
                    PuzzleOutcome::Failed(failure) => {
                        entry.status = "failed";
                        entry.stage = Some(failure.stage());
                        entry.error = Some(failure.error.to_string());
                    }
                }
                entry
            })
            .collect();
        serde_json::to_value(BatchReportJson {
            processed: self.processed(),
            skipped: self.skipped(),
            failed: self.failed(),
            puzzles,
        })
    }
}

#[derive(Serialize)]
struct BatchReportJson<'a> {
    processed: usize,
    skipped: usize,
    failed: usize,
    puzzles: Vec<PuzzleResultJson<'a>>,
}

#[derive(Serialize)]
struct PuzzleResultJson<'a> {
    #[serde(flatten)]
    key: &'a PuzzleKey,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a PuzzleSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Loads a puzzle folder and computes its plan without writing anything.
pub fn plan_folder(
    source: &PuzzleFolder,
    policy: &TolerancePolicy,
) -> Result<(LoadedPuzzle, PuzzlePlan), PuzzleError> {
    let loaded = source.load_index().map_err(PuzzleError::Load)?;
    let plan = plan_puzzle(&loaded.catalog, policy).map_err(PuzzleError::Layout)?;
    debug!(
        root = %source.root().display(),
        clustered_rows = plan.clustered_rows(),
        merges = plan.merges(),
        merge_passes = plan.merge_passes(),
        "planned puzzle"
    );
    Ok((loaded, plan))
}

/// Renumbers one puzzle from `config.source_root` into `config.output_root`.
pub fn renumber_puzzle(key: &PuzzleKey, config: &BatchConfig) -> PuzzleOutcome {
    let source = PuzzleFolder::new(config.source_root.join(key.folder_name()));
    if !source.exists() {
        warn!(puzzle = %key, root = %source.root().display(), "skipping missing puzzle folder");
        return PuzzleOutcome::Skipped;
    }
    let dest = PuzzleFolder::new(config.output_root.join(key.folder_name()))
        .with_durability(config.durability);

    let fail = |error| {
        PuzzleOutcome::Failed(PuzzleFailure {
            key: key.clone(),
            error,
        })
    };

    let (loaded, plan) = match plan_folder(&source, &config.policy) {
        Ok(planned) => planned,
        Err(error) => return fail(error),
    };
    let report = match dest.write_renumbered(&source, &loaded, &plan) {
        Ok(report) => report,
        Err(err) => return fail(PuzzleError::Rewrite(err)),
    };

    let mut summary = PuzzleSummary::from_plan(&plan);
    summary.renamed_assets = report.renamed_assets;
    summary.copied_assets = report.copied_assets;
    PuzzleOutcome::Processed(summary)
}

/// Renumbers every configured puzzle. Puzzles run in parallel; results keep the sorted key order.
pub fn run_batch(config: &BatchConfig) -> Result<BatchReport, BatchError> {
    let keys = config.puzzle_keys()?;
    info!(
        puzzles = keys.len(),
        source = %config.source_root.display(),
        output = %config.output_root.display(),
        "starting batch"
    );

    let results = keys
        .par_iter()
        .map(|key| {
            let outcome = renumber_puzzle(key, config);
            match &outcome {
                PuzzleOutcome::Processed(summary) => info!(
                    puzzle = %key,
                    pieces = summary.pieces,
                    rows = summary.rows,
                    merges = summary.merges,
                    "renumbered puzzle"
                ),
                PuzzleOutcome::Skipped => {}
                PuzzleOutcome::Failed(failure) => error!(
                    puzzle = %key,
                    stage = %failure.stage(),
                    error = %failure.error,
                    "puzzle failed"
                ),
            }
            PuzzleResult {
                key: key.clone(),
                outcome,
            }
        })
        .collect::<Vec<_>>();

    let report = BatchReport { results };
    info!(
        processed = report.processed(),
        skipped = report.skipped(),
        failed = report.failed(),
        "batch finished"
    );
    Ok(report)
}
