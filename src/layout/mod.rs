// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Layout algorithms for puzzle pieces.
//!
//! This module clusters pieces into rows, sequences them into a grid and rebuilds the adjacency
//! graph. It is pure computation: no I/O, no logging.

pub mod adjacency;
pub mod grid;
pub mod plan;
pub mod rows;
pub mod tolerance;

pub use adjacency::rebuild_adjacency;
pub use grid::sequence_grid;
pub use plan::{plan_puzzle, LayoutError, PuzzlePlan};
pub use rows::{cluster_rows, merge_rows, MergeOutcome};
pub use tolerance::{
    median_height, RowTolerance, TolerancePolicy, DEFAULT_MERGE_FACTOR,
    DEFAULT_ROW_TOLERANCE_FACTOR, DEFAULT_ROW_TOLERANCE_FLOOR,
};
