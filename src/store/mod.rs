// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for puzzle folders on disk.
//!
//! The store module reads a puzzle's `index.json` and writes the renumbered copy of every
//! id-bearing artifact (index, adjacency, id-keyed json, per-piece assets) next to the files
//! that are carried over unchanged.

pub mod puzzle_folder;
pub mod rekey;

pub use puzzle_folder::{
    LoadedPuzzle, PuzzleFolder, RewriteReport, StoreError, WriteDurability, ADJACENCY_FILENAME,
    INDEX_FILENAME, PIECES_DIRNAME, PIECES_FILENAME, PIECE_MASK_MAP_FILENAME,
};
pub use rekey::{
    adjacency_document, rekey_index_document, rekey_object, rekey_piece_properties,
    renamed_asset_name, RekeyError,
};
