// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{DuplicateSourceId, Grid, RenameMap, Row};

/// Orders rows top to bottom and pieces left to right, then numbers the cells row-major.
///
/// Both sorts are stable: rows with equal centers keep their merge order, and pieces with equal
/// `ox` keep their order of joining the row.
pub fn sequence_grid(rows: Vec<Row>) -> Result<(Grid, RenameMap), DuplicateSourceId> {
    let mut rows = rows;
    rows.sort_by(|a, b| a.center().total_cmp(&b.center()));
    let rows = rows.into_iter().map(Row::sorted_by_ox).collect::<Vec<_>>();

    let grid = Grid::from_sorted_rows(rows);
    let rename = RenameMap::from_canonical_order(grid.cells().map(|(_, _, id)| id))?;
    Ok((grid, rename))
}

#[cfg(test)]
mod tests {
    use super::sequence_grid;
    use crate::model::{PieceId, Row, RowMember, SourceId};

    fn member(id: i64, ox: f64, mid_y: f64) -> RowMember {
        RowMember {
            id: SourceId::new(id),
            ox,
            mid_y,
        }
    }

    #[test]
    fn numbers_rows_top_to_bottom_and_left_to_right() {
        let lower = Row::new(member(1, 10.0, 15.0)).joined(member(9, 0.0, 15.0));
        let upper = Row::new(member(3, 10.0, 5.0)).joined(member(7, 0.0, 5.0));

        let (grid, rename) = sequence_grid(vec![lower, upper]).unwrap();

        let layout = grid
            .rows()
            .iter()
            .map(|row| row.ids().map(|id| id.get()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(layout, vec![vec![7, 3], vec![9, 1]]);

        let order = rename.iter().map(|(_, old)| old.get()).collect::<Vec<_>>();
        assert_eq!(order, vec![7, 3, 9, 1]);
        assert_eq!(rename.new_id(SourceId::new(1)), Some(PieceId::new(3)));
    }

    #[test]
    fn renumbering_follows_row_major_traversal() {
        let rows = vec![
            Row::new(member(40, 30.0, 50.0))
                .joined(member(41, 10.0, 51.0))
                .joined(member(42, 20.0, 49.0)),
            Row::new(member(10, 5.0, 1.0)).joined(member(11, 0.0, 0.0)),
        ];
        let (grid, rename) = sequence_grid(rows).unwrap();

        for (k, (_, _, old)) in grid.cells().enumerate() {
            assert_eq!(rename.new_id(old), Some(PieceId::from_index(k)));
        }
        assert_eq!(grid.row_lengths(), vec![2, 3]);
        assert_eq!(rename.len(), grid.piece_count());
    }
}
