// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Pieces come in with source ids and bounding boxes; layout turns them into rows, a grid, a
//! rename map and an adjacency graph keyed by canonical ids.

pub mod adjacency;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod grid;
pub mod ids;
pub mod piece;
pub mod rename;

pub use adjacency::{AdjacencyGraph, Link, Links, Side};
pub use grid::{Grid, Row, RowMember};
pub use ids::{Id, IdError, PieceId, PieceIdTag, SourceId, SourceIdTag};
pub use piece::{PieceBounds, PieceRecord};
pub use rename::{Direction, DuplicateSourceId, RenameMap, Translation};
