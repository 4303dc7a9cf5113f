// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Map, Value};
use tessera::catalog::Catalog;
use tessera::layout::PuzzlePlan;
use tessera::store::PuzzleFolder;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("tessera_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

pub fn checksum_plan(plan: &PuzzlePlan) -> u64 {
    let mut acc = 0u64;
    for (new, old) in plan.rename().iter() {
        acc = acc.wrapping_mul(131).wrapping_add(new.get() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(old.get() as u64);
    }
    for len in plan.grid().row_lengths() {
        acc = acc.wrapping_mul(131).wrapping_add(len as u64);
    }
    acc.wrapping_mul(131).wrapping_add(plan.adjacency().edge_count() as u64)
}

pub mod puzzle {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Params {
        pub cols: usize,
        pub rows: usize,
        /// Bytes per raster file when a folder is written.
        pub raster_bytes: usize,
    }

    impl Params {
        pub const fn new(cols: usize, rows: usize, raster_bytes: usize) -> Self {
            Self {
                cols,
                rows,
                raster_bytes,
            }
        }

        pub const fn pieces(self) -> usize {
            self.cols * self.rows
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Case {
        Pieces10,
        Pieces100,
        Pieces500,
    }

    impl Case {
        pub const fn id(self) -> &'static str {
            match self {
                Self::Pieces10 => "pieces_10",
                Self::Pieces100 => "pieces_100",
                Self::Pieces500 => "pieces_500",
            }
        }

        pub const fn params(self) -> Params {
            match self {
                Self::Pieces10 => Params::new(5, 2, 256),
                Self::Pieces100 => Params::new(10, 10, 256),
                Self::Pieces500 => Params::new(25, 20, 256),
            }
        }
    }

    fn source_id(idx: usize) -> i64 {
        (idx as i64) * 7 + 3
    }

    /// `index.json` of a jittered grid, records in a scrambled export order.
    ///
    /// - Heights vary by tab size (0..16 px) on a 100 px cell.
    /// - `mid_y` jitters by a few pixels, well inside the row tolerance.
    pub fn index(params: Params) -> Value {
        let count = params.pieces();
        let mut records = Vec::with_capacity(count);
        for k in 0..count {
            let idx = (k * 11) % count.max(1);
            let r = idx / params.cols;
            let c = idx % params.cols;
            let tab = ((idx * 13) % 5) as f64 * 4.0;
            let jitter = ((idx * 37) % 7) as f64 - 3.0;
            records.push(json!({
                "id": source_id(idx),
                "ox": c as f64 * 80.0 + jitter * 0.5,
                "oy": r as f64 * 100.0 - tab / 2.0 + jitter,
                "ow": 80.0 + tab,
                "oh": 100.0 + tab,
                "rotation": 0
            }));
        }
        json!({
            "width": params.cols * 80,
            "height": params.rows * 100,
            "piece_properties": records
        })
    }

    pub fn catalog(case: Case) -> Catalog {
        Catalog::from_index_json(&index(case.params())).expect("fixture catalog")
    }

    /// Writes a complete puzzle folder under `root` and returns it.
    pub fn write_folder(root: &Path, params: Params) -> PuzzleFolder {
        let folder = PuzzleFolder::new(root.join(format!("bench_{}", params.pieces())));
        let pieces = folder.pieces_dir();
        for dir in ["raster", "raster_with_padding", "mask", "vector"] {
            std::fs::create_dir_all(pieces.join(dir)).expect("create pieces dir");
        }

        let index = index(params);
        std::fs::write(folder.index_path(), index.to_string()).expect("write index");

        let mut mask_map = Map::new();
        let raster = vec![0xA5u8; params.raster_bytes];
        for idx in 0..params.pieces() {
            let id = source_id(idx);
            mask_map.insert(id.to_string(), json!(format!("mask-{}", idx % 4)));
            std::fs::write(pieces.join("raster").join(format!("{id}.png")), &raster)
                .expect("write raster");
            std::fs::write(pieces.join("raster_with_padding").join(format!("{id}.png")), &raster)
                .expect("write padded raster");
        }
        std::fs::write(
            pieces.join("piece_id_to_mask.json"),
            Value::Object(mask_map).to_string(),
        )
        .expect("write mask map");
        for m in 0..4 {
            std::fs::write(pieces.join("mask").join(format!("mask-{m}.png")), &raster)
                .expect("write mask");
        }
        std::fs::write(pieces.join("vector").join("outline.svg"), "<svg/>").expect("write vector");
        std::fs::write(pieces.join("sides.json"), "[]").expect("write sides");

        folder
    }
}
