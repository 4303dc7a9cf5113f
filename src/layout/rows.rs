// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Row clustering and row merging.

use crate::model::{Row, RowMember};

/// Greedy single-pass row clustering.
///
/// Members are visited in ascending `mid_y` (stable, so equal values keep their input order).
/// Each one joins the first row, in creation order, whose current center is within `tolerance`,
/// or starts a new row. The result depends on visiting order and is not a globally optimal
/// partition.
pub fn cluster_rows(members: &[RowMember], tolerance: f64) -> Vec<Row> {
    let mut sorted = members.to_vec();
    sorted.sort_by(|a, b| a.mid_y.total_cmp(&b.mid_y));

    let mut rows: Vec<Row> = Vec::new();
    for member in sorted {
        match rows
            .iter()
            .position(|row| (member.mid_y - row.center()).abs() <= tolerance)
        {
            Some(idx) => rows[idx] = rows[idx].joined(member),
            None => rows.push(Row::new(member)),
        }
    }
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub rows: Vec<Row>,
    pub merges: usize,
    /// Passes run, including the final pass that merged nothing.
    pub passes: usize,
}

/// Coalesces rows whose centers lie within `tolerance` until a full pass merges nothing.
///
/// Within a pass, row `i` absorbs every later surviving row `j` close to its *current* center;
/// the center is recomputed after each absorption. Every merge removes a row, so at most
/// `rows.len() - 1` merges happen.
pub fn merge_rows(rows: Vec<Row>, tolerance: f64) -> MergeOutcome {
    let mut rows = rows;
    let mut merges = 0;
    let mut passes = 0;

    loop {
        passes += 1;
        let mut merged_this_pass = 0;
        let mut pending = rows.into_iter().map(Some).collect::<Vec<_>>();
        let mut next = Vec::with_capacity(pending.len());

        for i in 0..pending.len() {
            let Some(mut base) = pending[i].take() else {
                continue;
            };
            for slot in pending.iter_mut().skip(i + 1) {
                let close = slot
                    .as_ref()
                    .is_some_and(|other| (base.center() - other.center()).abs() <= tolerance);
                if close {
                    if let Some(other) = slot.take() {
                        base = base.absorbed(other);
                        merged_this_pass += 1;
                    }
                }
            }
            next.push(base);
        }

        rows = next;
        merges += merged_this_pass;
        if merged_this_pass == 0 {
            break;
        }
    }

    MergeOutcome {
        rows,
        merges,
        passes,
    }
}
