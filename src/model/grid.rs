// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::SourceId;
use super::piece::PieceRecord;

/// The slice of a piece that row clustering and sequencing look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMember {
    pub id: SourceId,
    pub ox: f64,
    pub mid_y: f64,
}

impl RowMember {
    pub fn from_record(record: &PieceRecord) -> Self {
        Self {
            id: record.id(),
            ox: record.bounds().ox,
            mid_y: record.mid_y(),
        }
    }
}

/// A horizontal band of pieces.
///
/// Rows are snapshots: every change of membership produces a new row whose center is computed
/// from scratch over all members, so the center never accumulates incremental rounding error.
/// A row is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    members: Vec<RowMember>,
    center: f64,
}

impl Row {
    pub fn new(first: RowMember) -> Self {
        Self {
            center: first.mid_y,
            members: vec![first],
        }
    }

    fn from_members(members: Vec<RowMember>) -> Self {
        let center = members.iter().map(|m| m.mid_y).sum::<f64>() / members.len() as f64;
        Self { members, center }
    }

    /// Returns this row with `member` appended.
    pub fn joined(&self, member: RowMember) -> Self {
        let mut members = Vec::with_capacity(self.members.len() + 1);
        members.extend_from_slice(&self.members);
        members.push(member);
        Self::from_members(members)
    }

    /// Returns this row with all members of `other` appended after its own.
    pub fn absorbed(self, other: Row) -> Self {
        let mut members = self.members;
        members.extend(other.members);
        Self::from_members(members)
    }

    /// Returns the row with members ordered left to right; ties keep their current order.
    pub fn sorted_by_ox(self) -> Self {
        let mut members = self.members;
        members.sort_by(|a, b| a.ox.total_cmp(&b.ox));
        Self {
            members,
            center: self.center,
        }
    }

    /// Mean `mid_y` of the members.
    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn members(&self) -> &[RowMember] {
        &self.members
    }

    pub fn ids(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.members.iter().map(|m| m.id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Rows ordered top to bottom, each ordered left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Row>,
}

impl Grid {
    pub(crate) fn from_sorted_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_lengths(&self) -> Vec<usize> {
        self.rows.iter().map(Row::len).collect()
    }

    pub fn piece_count(&self) -> usize {
        self.rows.iter().map(Row::len).sum()
    }

    /// The source id at `(row, col)`, if that cell exists. Rows may differ in length.
    pub fn cell(&self, row: usize, col: usize) -> Option<SourceId> {
        self.rows.get(row)?.members.get(col).map(|m| m.id)
    }

    /// Visits every cell in row-major order as `(row, col, source id)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, SourceId)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.members
                .iter()
                .enumerate()
                .map(move |(c, member)| (r, c, member.id))
        })
    }
}
