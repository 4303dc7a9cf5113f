// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Consistency checks for `adjacent.json` documents.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::batch::PuzzleKey;
use crate::store::ADJACENCY_FILENAME;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIssue {
    SelfLoop { node: String },
    MissingNode { node: String, neighbor: String },
    Asymmetric { node: String, neighbor: String },
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLoop { node } => write!(f, "self-loop: {node} -> {node}"),
            Self::MissingNode { node, neighbor } => {
                write!(f, "missing node reference: {node} -> {neighbor}")
            }
            Self::Asymmetric { node, neighbor } => write!(
                f,
                "asymmetric adjacency: {node} -> {neighbor} but {neighbor} -> {node} is missing"
            ),
        }
    }
}

#[derive(Debug)]
pub enum CheckError {
    NotAnObject,
    InvalidNeighbors { node: String },
    InvalidJson { path: PathBuf, source: serde_json::Error },
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("adjacency root must be a json object"),
            Self::InvalidNeighbors { node } => {
                write!(f, "neighbors of {node} must be an array of ids")
            }
            Self::InvalidJson { path, source } => write!(f, "invalid json in {path:?}: {source}"),
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidJson { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::NotAnObject | Self::InvalidNeighbors { .. } => None,
        }
    }
}

fn node_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Checks that an adjacency document describes an undirected graph. Repeated neighbors count
/// once. Issues are listed in document order.
pub fn check_graph(doc: &Value) -> Result<Vec<GraphIssue>, CheckError> {
    let Some(root) = doc.as_object() else {
        return Err(CheckError::NotAnObject);
    };

    let mut graph = Vec::with_capacity(root.len());
    for (node, neighbors) in root {
        let invalid = || CheckError::InvalidNeighbors { node: node.clone() };
        let neighbors = neighbors.as_array().ok_or_else(invalid)?;
        let mut seen = HashSet::with_capacity(neighbors.len());
        let mut ids = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            let id = node_key(neighbor).ok_or_else(invalid)?;
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
        graph.push((node.as_str(), ids));
    }

    let lookup = graph
        .iter()
        .map(|(node, ids)| (*node, ids.iter().map(String::as_str).collect::<HashSet<_>>()))
        .collect::<HashMap<_, _>>();

    let mut issues = Vec::new();
    for (node, ids) in &graph {
        if ids.iter().any(|id| id == node) {
            issues.push(GraphIssue::SelfLoop {
                node: (*node).to_owned(),
            });
        }
        for neighbor in ids {
            match lookup.get(neighbor.as_str()) {
                None => issues.push(GraphIssue::MissingNode {
                    node: (*node).to_owned(),
                    neighbor: neighbor.clone(),
                }),
                Some(back) if !back.contains(node) => issues.push(GraphIssue::Asymmetric {
                    node: (*node).to_owned(),
                    neighbor: neighbor.clone(),
                }),
                Some(_) => {}
            }
        }
    }
    Ok(issues)
}

#[derive(Debug)]
pub enum CheckOutcome {
    Consistent,
    Issues(Vec<GraphIssue>),
    MissingAdjacency,
    Invalid(CheckError),
}

impl CheckOutcome {
    pub fn error_count(&self) -> usize {
        match self {
            Self::Consistent => 0,
            Self::Issues(issues) => issues.len(),
            Self::MissingAdjacency | Self::Invalid(_) => 1,
        }
    }
}

#[derive(Debug)]
pub struct PuzzleCheck {
    pub key: PuzzleKey,
    pub outcome: CheckOutcome,
}

#[derive(Debug, Default)]
pub struct CheckReport {
    pub puzzles: Vec<PuzzleCheck>,
}

impl CheckReport {
    pub fn puzzles_checked(&self) -> usize {
        self.puzzles.len()
    }

    pub fn total_errors(&self) -> usize {
        self.puzzles.iter().map(|p| p.outcome.error_count()).sum()
    }
}

/// Checks one `adjacent.json` file.
pub fn check_file(path: &Path) -> CheckOutcome {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return CheckOutcome::MissingAdjacency,
        Err(source) => {
            return CheckOutcome::Invalid(CheckError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let doc = match serde_json::from_str::<Value>(&raw) {
        Ok(doc) => doc,
        Err(source) => {
            return CheckOutcome::Invalid(CheckError::InvalidJson {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    match check_graph(&doc) {
        Ok(issues) if issues.is_empty() => CheckOutcome::Consistent,
        Ok(issues) => CheckOutcome::Issues(issues),
        Err(err) => CheckOutcome::Invalid(err),
    }
}

/// Checks every puzzle folder under `root` whose key is accepted by `accept`, in folder name
/// order.
pub fn check_root(
    root: &Path,
    accept: impl Fn(&PuzzleKey) -> bool,
) -> Result<CheckReport, CheckError> {
    let io_err = |source| CheckError::Io {
        path: root.to_path_buf(),
        source,
    };
    let mut folders = Vec::new();
    for entry in fs::read_dir(root).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(ToOwned::to_owned) else {
            continue;
        };
        match PuzzleKey::parse(&name) {
            Some(key) if accept(&key) => folders.push((name, key, path)),
            _ => {}
        }
    }
    folders.sort_by(|a, b| a.0.cmp(&b.0));

    let puzzles = folders
        .into_iter()
        .map(|(_, key, path)| {
            let outcome = check_file(&path.join(ADJACENCY_FILENAME));
            debug!(puzzle = %key, errors = outcome.error_count(), "checked adjacency");
            PuzzleCheck { key, outcome }
        })
        .collect();
    Ok(CheckReport { puzzles })
}
