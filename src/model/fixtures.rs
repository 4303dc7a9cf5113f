// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::catalog::Catalog;

use super::ids::SourceId;
use super::piece::{PieceBounds, PieceRecord};

pub(crate) fn record(id: i64, ox: f64, oy: f64, ow: f64, oh: f64) -> PieceRecord {
    PieceRecord::new(SourceId::new(id), PieceBounds::new(ox, oy, ow, oh))
}

fn catalog(records: Vec<PieceRecord>) -> Catalog {
    Catalog::from_pieces(records).expect("fixture catalog")
}

/// Two rows of two, exported out of order with sparse ids.
pub(crate) fn four_piece_square() -> Catalog {
    catalog(vec![
        record(7, 0.0, 0.0, 10.0, 10.0),
        record(3, 10.0, 0.0, 10.0, 10.0),
        record(9, 0.0, 10.0, 10.0, 10.0),
        record(1, 10.0, 10.0, 10.0, 10.0),
    ])
}

/// A `cols x rows` grid with tab-sized height variation and a little vertical jitter, exported
/// in a scrambled order with sparse ids. Deterministic.
///
/// Returns the catalog and the source ids in expected row-major order.
pub(crate) fn jittered_grid(cols: usize, rows: usize) -> (Catalog, Vec<SourceId>) {
    let cell_w = 80.0;
    let cell_h = 100.0;
    let count = cols * rows;

    let mut expected = Vec::with_capacity(count);
    let mut records = Vec::with_capacity(count);
    for idx in 0..count {
        let r = idx / cols;
        let c = idx % cols;
        let tab = ((idx * 13) % 5) as f64 * 4.0;
        let jitter = ((idx * 37) % 7) as f64 - 3.0;
        let id = (idx as i64) * 3 + 11;
        expected.push(SourceId::new(id));
        records.push(record(
            id,
            c as f64 * cell_w + jitter * 0.5,
            r as f64 * cell_h - tab / 2.0 + jitter,
            cell_w + tab,
            cell_h + tab,
        ));
    }

    // 7 is coprime with every size used by the tests, so this is a permutation.
    let step = 7 % count.max(1);
    let step = if step == 0 { 1 } else { step };
    let mut scrambled = Vec::with_capacity(count);
    for k in 0..count {
        scrambled.push(records[(k * step) % count].clone());
    }

    (catalog(scrambled), expected)
}

/// Rows of 3, 2 and 3 pieces; the middle row is ragged.
pub(crate) fn ragged_rows() -> Catalog {
    catalog(vec![
        record(100, 0.0, 0.0, 10.0, 10.0),
        record(101, 10.0, 0.0, 10.0, 10.0),
        record(102, 20.0, 0.0, 10.0, 10.0),
        record(200, 15.0, 20.0, 10.0, 10.0),
        record(201, 5.0, 20.0, 10.0, 10.0),
        record(300, 0.0, 40.0, 10.0, 10.0),
        record(301, 10.0, 40.0, 10.0, 10.0),
        record(302, 20.0, 40.0, 10.0, 10.0),
    ])
}

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A scratch folder under the system temp dir, removed on drop.
pub(crate) struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub(crate) fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("tessera-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}
