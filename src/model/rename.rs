// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;
use std::fmt;

use super::ids::{PieceId, SourceId};

/// Bijection between canonical ids (`0..N`) and source ids.
///
/// Both directions are stored, so lookups either way are O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMap {
    by_new: Vec<SourceId>,
    by_old: HashMap<SourceId, PieceId>,
}

impl RenameMap {
    /// Builds the map from source ids listed in canonical order.
    ///
    /// Returns the first repeated source id if the sequence is not duplicate-free.
    pub fn from_canonical_order(
        order: impl IntoIterator<Item = SourceId>,
    ) -> Result<Self, DuplicateSourceId> {
        let mut map = Self::default();
        for old in order {
            let new = PieceId::from_index(map.by_new.len());
            if map.by_old.insert(old, new).is_some() {
                return Err(DuplicateSourceId { id: old });
            }
            map.by_new.push(old);
        }
        Ok(map)
    }

    pub fn len(&self) -> usize {
        self.by_new.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_new.is_empty()
    }

    pub fn new_id(&self, old: SourceId) -> Option<PieceId> {
        self.by_old.get(&old).copied()
    }

    pub fn old_id(&self, new: PieceId) -> Option<SourceId> {
        if new.get() < 0 {
            return None;
        }
        self.by_new.get(new.index()).copied()
    }

    /// `(new, old)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (PieceId, SourceId)> + '_ {
        self.by_new
            .iter()
            .enumerate()
            .map(|(idx, old)| (PieceId::from_index(idx), *old))
    }

    pub fn forward(&self) -> Translation<'_> {
        Translation {
            map: self,
            direction: Direction::Forward,
        }
    }

    pub fn inverse(&self) -> Translation<'_> {
        Translation {
            map: self,
            direction: Direction::Inverse,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateSourceId {
    pub id: SourceId,
}

impl fmt::Display for DuplicateSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source id {} appears more than once", self.id)
    }
}

impl std::error::Error for DuplicateSourceId {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Source id to canonical id.
    Forward,
    /// Canonical id to source id.
    Inverse,
}

/// A [`RenameMap`] viewed in one direction over raw integer ids, as found in artifacts.
#[derive(Debug, Clone, Copy)]
pub struct Translation<'a> {
    map: &'a RenameMap,
    direction: Direction,
}

impl Translation<'_> {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn translate(&self, id: i64) -> Option<i64> {
        match self.direction {
            Direction::Forward => self.map.new_id(SourceId::new(id)).map(PieceId::get),
            Direction::Inverse => self.map.old_id(PieceId::new(id)).map(SourceId::get),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Every id this translation accepts, in canonical order.
    pub fn domain(&self) -> impl Iterator<Item = i64> + '_ {
        let direction = self.direction;
        self.map.iter().map(move |(new, old)| match direction {
            Direction::Forward => old.get(),
            Direction::Inverse => new.get(),
        })
    }
}
