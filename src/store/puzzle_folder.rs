// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::debug;

use crate::catalog::{Catalog, CatalogError};
use crate::layout::PuzzlePlan;
use crate::model::Translation;

use super::rekey::{
    adjacency_document, rekey_index_document, rekey_object, renamed_asset_name, RekeyError,
};

pub const INDEX_FILENAME: &str = "index.json";
pub const ADJACENCY_FILENAME: &str = "adjacent.json";
pub const PIECES_DIRNAME: &str = "pieces";
pub const PIECE_MASK_MAP_FILENAME: &str = "piece_id_to_mask.json";
pub const PIECES_FILENAME: &str = "pieces.json";

/// Per-piece asset folders under `pieces/` whose files are named by piece id.
const RENAMED_ASSET_DIRS: [&str; 2] = ["raster", "raster_with_padding"];
/// Asset folders under `pieces/` that are copied as they are.
const VERBATIM_ASSET_DIRS: [&str; 2] = ["mask", "vector"];
const STATIC_PIECE_FILES: [&str; 4] = [
    "cut_proof-0.html",
    "lines-resized.png",
    "original-resized-0.jpg",
    "sides.json",
];
const STATIC_ROOT_FILES: [&str; 3] = ["lines-resized.png", "lines-resized.svg", "lines.svg"];

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    Catalog {
        path: PathBuf,
        source: CatalogError,
    },
    UnmappedId {
        artifact: PathBuf,
        id: i64,
    },
    MissingEntry {
        artifact: PathBuf,
        id: i64,
    },
    MalformedArtifact {
        artifact: PathBuf,
        source: RekeyError,
    },
    InvalidRelativePath {
        field: &'static str,
        value: PathBuf,
    },
    PathOutsideFolder {
        folder: PathBuf,
        path: PathBuf,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl StoreError {
    fn from_rekey(artifact: &Path, err: RekeyError) -> Self {
        let artifact = artifact.to_path_buf();
        match err {
            RekeyError::UnmappedId { id } => Self::UnmappedId { artifact, id },
            RekeyError::MissingEntry { id } => Self::MissingEntry { artifact, id },
            source => Self::MalformedArtifact { artifact, source },
        }
    }

    /// The offending path, for reports.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::Json { path, .. }
            | Self::Catalog { path, .. }
            | Self::SymlinkRefused { path } => path,
            Self::UnmappedId { artifact, .. }
            | Self::MissingEntry { artifact, .. }
            | Self::MalformedArtifact { artifact, .. } => artifact,
            Self::InvalidRelativePath { value, .. } => value,
            Self::PathOutsideFolder { path, .. } => path,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::Catalog { path, source } => write!(f, "cannot load {path:?}: {source}"),
            Self::UnmappedId { artifact, id } => write!(
                f,
                "{artifact:?} references piece id {id}, which is not in the catalog"
            ),
            Self::MissingEntry { artifact, id } => {
                write!(f, "{artifact:?} has no entry for catalog piece id {id}")
            }
            Self::MalformedArtifact { artifact, source } => {
                write!(f, "cannot rewrite {artifact:?}: {source}")
            }
            Self::InvalidRelativePath { field, value } => {
                write!(f, "invalid relative path for {field}: {value:?}")
            }
            Self::PathOutsideFolder { folder, path } => {
                write!(f, "path {path:?} is outside puzzle folder {folder:?}")
            }
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Catalog { source, .. } => Some(source),
            Self::MalformedArtifact { source, .. } => Some(source),
            Self::UnmappedId { .. } => None,
            Self::MissingEntry { .. } => None,
            Self::InvalidRelativePath { .. } => None,
            Self::PathOutsideFolder { .. } => None,
            Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file (or staging folder) and renames it into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// A puzzle's `index.json` as read from disk, together with the catalog parsed from it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPuzzle {
    pub index: Value,
    pub catalog: Catalog,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Files and folders written, relative to the destination folder, in write order.
    pub artifacts: Vec<PathBuf>,
    pub renamed_assets: usize,
    pub copied_assets: usize,
}

/// One puzzle at one size: `index.json`, `adjacent.json` and a `pieces/` folder.
#[derive(Debug, Clone)]
pub struct PuzzleFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl PuzzleFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILENAME)
    }

    pub fn adjacency_path(&self) -> PathBuf {
        self.root.join(ADJACENCY_FILENAME)
    }

    pub fn pieces_dir(&self) -> PathBuf {
        self.root.join(PIECES_DIRNAME)
    }

    /// Where `pieces.json` lives: inside `pieces/` when present there, else at the root.
    pub fn pieces_json_path(&self) -> Option<PathBuf> {
        [
            self.pieces_dir().join(PIECES_FILENAME),
            self.root.join(PIECES_FILENAME),
        ]
        .into_iter()
        .find(|path| path.is_file())
    }

    pub fn load_index(&self) -> Result<LoadedPuzzle, StoreError> {
        let path = self.index_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::Catalog {
                    path,
                    source: CatalogError::MissingCatalog {
                        reason: format!("{INDEX_FILENAME} not found"),
                    },
                });
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let index: Value = serde_json::from_str(&raw).map_err(|err| StoreError::Catalog {
            path: path.clone(),
            source: CatalogError::MissingCatalog {
                reason: format!("invalid json: {err}"),
            },
        })?;
        let catalog = Catalog::from_index_json(&index).map_err(|source| StoreError::Catalog {
            path: path.clone(),
            source,
        })?;

        Ok(LoadedPuzzle { index, catalog })
    }

    pub fn load_adjacency(&self) -> Result<Value, StoreError> {
        let path = self.adjacency_path();
        read_json(&path)?.ok_or_else(|| StoreError::Io {
            path,
            source: io::Error::new(io::ErrorKind::NotFound, "adjacency file not found"),
        })
    }

    /// Writes the renumbered version of `source` into this folder.
    ///
    /// Every artifact is staged and renamed into place, so an artifact that fails leaves no
    /// partial output and the artifacts written before it stay intact. The rewrite stops at the
    /// first failing artifact.
    pub fn write_renumbered(
        &self,
        source: &PuzzleFolder,
        loaded: &LoadedPuzzle,
        plan: &PuzzlePlan,
    ) -> Result<RewriteReport, StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;

        let forward = plan.rename().forward();
        let mut report = RewriteReport::default();

        let index_path = self.index_path();
        let index = rekey_index_document(&loaded.index, &forward)
            .map_err(|err| StoreError::from_rekey(&source.index_path(), err))?;
        self.write_json(&index_path, &index)?;
        report.artifacts.push(PathBuf::from(INDEX_FILENAME));

        self.write_json(&self.adjacency_path(), &adjacency_document(plan.adjacency()))?;
        report.artifacts.push(PathBuf::from(ADJACENCY_FILENAME));

        let mask_map = source.pieces_dir().join(PIECE_MASK_MAP_FILENAME);
        let mask_map_rel = Path::new(PIECES_DIRNAME).join(PIECE_MASK_MAP_FILENAME);
        if self.rekey_json_artifact(&mask_map, &mask_map_rel, &forward)? {
            report.artifacts.push(mask_map_rel);
        }

        if let Some(pieces_json) = source.pieces_json_path() {
            let relative = to_relative_path(source.root(), &pieces_json, "pieces.json")?;
            if self.rekey_json_artifact(&pieces_json, &relative, &forward)? {
                report.artifacts.push(relative);
            }
        }

        for dir in RENAMED_ASSET_DIRS {
            let relative = Path::new(PIECES_DIRNAME).join(dir);
            let from = source.root().join(&relative);
            if !from.is_dir() {
                continue;
            }
            let renamed = replace_dir_staged(&self.root, &relative, self.durability, |staging| {
                copy_renamed_assets(&from, staging, &forward)
            })?;
            debug!(dir = %relative.display(), files = renamed, "renamed per-piece assets");
            report.renamed_assets += renamed;
            report.artifacts.push(relative);
        }

        for dir in VERBATIM_ASSET_DIRS {
            let relative = Path::new(PIECES_DIRNAME).join(dir);
            let from = source.root().join(&relative);
            if !from.is_dir() {
                continue;
            }
            let copied = replace_dir_staged(&self.root, &relative, self.durability, |staging| {
                copy_tree(&from, staging)
            })?;
            report.copied_assets += copied;
            report.artifacts.push(relative);
        }

        let static_files = STATIC_PIECE_FILES
            .iter()
            .map(|name| Path::new(PIECES_DIRNAME).join(name))
            .chain(STATIC_ROOT_FILES.iter().map(|name| PathBuf::from(*name)));
        for relative in static_files {
            let from = source.root().join(&relative);
            if !from.is_file() {
                continue;
            }
            let bytes = fs::read(&from).map_err(|source| StoreError::Io {
                path: from.clone(),
                source,
            })?;
            write_atomic_in_folder(&self.root, &self.root.join(&relative), &bytes, self.durability)?;
            report.copied_assets += 1;
            report.artifacts.push(relative);
        }

        Ok(report)
    }

    /// Re-keys the id-keyed object at `from` into `relative` under this folder. Returns `false`
    /// when `from` does not exist.
    fn rekey_json_artifact(
        &self,
        from: &Path,
        relative: &Path,
        translation: &Translation<'_>,
    ) -> Result<bool, StoreError> {
        let Some(doc) = read_json(from)? else {
            return Ok(false);
        };
        let Some(object) = doc.as_object() else {
            return Err(StoreError::from_rekey(from, RekeyError::NotAnObject));
        };
        let rekeyed =
            rekey_object(object, translation).map_err(|err| StoreError::from_rekey(from, err))?;
        self.write_json(&self.root.join(relative), &Value::Object(rekeyed))?;
        debug!(artifact = %relative.display(), "rewrote id-keyed artifact");
        Ok(true)
    }

    fn write_json(&self, path: &Path, doc: &Value) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(doc).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        write_atomic_in_folder(
            &self.root,
            path,
            format!("{text}\n").as_bytes(),
            self.durability,
        )
    }
}

include!("puzzle_folder/helpers.rs");
