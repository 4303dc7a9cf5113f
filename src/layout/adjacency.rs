// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{AdjacencyGraph, Grid, Link, Links, PieceId, Side};

/// Builds the four-neighbor graph from grid positions alone.
///
/// Cell `(r, c)` links to `(r, c-1)`, `(r-1, c)`, `(r, c+1)` and `(r+1, c)` when those cells
/// exist. Vertical links pair cells by column index, not by x-position, so rows of different
/// lengths can be linked to pieces that are horizontally offset from them.
///
/// Canonical ids are the row-major cell positions, so no rename lookup is needed here.
pub fn rebuild_adjacency(grid: &Grid) -> AdjacencyGraph {
    let row_starts = grid
        .rows()
        .iter()
        .scan(0usize, |next, row| {
            let start = *next;
            *next += row.len();
            Some(start)
        })
        .collect::<Vec<_>>();
    let row_lengths = grid.row_lengths();

    let cell_id = |r: usize, c: usize| -> Option<PieceId> {
        (c < *row_lengths.get(r)?).then(|| PieceId::from_index(row_starts[r] + c))
    };

    let mut links = Vec::with_capacity(grid.piece_count());
    for (r, c, _) in grid.cells() {
        let mut here = Links::new();
        for side in Side::ALL {
            let neighbor = match side {
                Side::Left => c.checked_sub(1).and_then(|c| cell_id(r, c)),
                Side::Up => r.checked_sub(1).and_then(|r| cell_id(r, c)),
                Side::Right => cell_id(r, c + 1),
                Side::Down => cell_id(r + 1, c),
            };
            if let Some(piece) = neighbor {
                here.push(Link { side, piece });
            }
        }
        links.push(here);
    }

    AdjacencyGraph::from_links(links)
}
