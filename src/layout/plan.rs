// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use crate::catalog::Catalog;
use crate::model::{AdjacencyGraph, DuplicateSourceId, Grid, RenameMap, RowMember, SourceId};

use super::adjacency::rebuild_adjacency;
use super::grid::sequence_grid;
use super::rows::{cluster_rows, merge_rows};
use super::tolerance::{RowTolerance, TolerancePolicy};

/// Everything the rewriter needs to renumber one puzzle.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzlePlan {
    tolerance: RowTolerance,
    clustered_rows: usize,
    merges: usize,
    merge_passes: usize,
    grid: Grid,
    rename: RenameMap,
    adjacency: AdjacencyGraph,
}

impl PuzzlePlan {
    pub fn tolerance(&self) -> &RowTolerance {
        &self.tolerance
    }

    /// Row count produced by the greedy pass, before merging.
    pub fn clustered_rows(&self) -> usize {
        self.clustered_rows
    }

    pub fn merges(&self) -> usize {
        self.merges
    }

    pub fn merge_passes(&self) -> usize {
        self.merge_passes
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rename(&self) -> &RenameMap {
        &self.rename
    }

    pub fn adjacency(&self) -> &AdjacencyGraph {
        &self.adjacency
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    EmptyPieceSet,
    DuplicatePiece { id: SourceId },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPieceSet => f.write_str("puzzle has no pieces; nothing to cluster"),
            Self::DuplicatePiece { id } => write!(f, "piece {id} was placed in the grid twice"),
        }
    }
}

impl std::error::Error for LayoutError {}

impl From<DuplicateSourceId> for LayoutError {
    fn from(err: DuplicateSourceId) -> Self {
        Self::DuplicatePiece { id: err.id }
    }
}

/// Runs clustering, merging, sequencing and adjacency rebuilding for one puzzle.
pub fn plan_puzzle(catalog: &Catalog, policy: &TolerancePolicy) -> Result<PuzzlePlan, LayoutError> {
    let tolerance = policy
        .tolerance_for(catalog.heights())
        .ok_or(LayoutError::EmptyPieceSet)?;

    let members = catalog
        .pieces()
        .iter()
        .map(RowMember::from_record)
        .collect::<Vec<_>>();

    let rows = cluster_rows(&members, tolerance.row);
    let clustered_rows = rows.len();
    let merged = merge_rows(rows, tolerance.merge);
    let (grid, rename) = sequence_grid(merged.rows)?;
    let adjacency = rebuild_adjacency(&grid);

    Ok(PuzzlePlan {
        tolerance,
        clustered_rows,
        merges: merged.merges,
        merge_passes: merged.passes,
        grid,
        rename,
        adjacency,
    })
}
