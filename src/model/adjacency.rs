// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smallvec::SmallVec;

use super::ids::PieceId;

/// Which edge of a piece a neighbor touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Left,
    Up,
    Right,
    Down,
}

impl Side {
    /// Listing order used for neighbor lists.
    pub const ALL: [Side; 4] = [Side::Left, Side::Up, Side::Right, Side::Down];

    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub side: Side,
    pub piece: PieceId,
}

pub type Links = SmallVec<[Link; 4]>;

/// Four-neighbor graph keyed by canonical id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyGraph {
    links: Vec<Links>,
}

impl AdjacencyGraph {
    pub(crate) fn from_links(links: Vec<Links>) -> Self {
        Self { links }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn links(&self, piece: PieceId) -> &[Link] {
        if piece.get() < 0 {
            return &[];
        }
        self.links.get(piece.index()).map(|l| l.as_slice()).unwrap_or(&[])
    }

    /// Neighbor ids in left, up, right, down order (missing sides skipped).
    pub fn neighbors(&self, piece: PieceId) -> impl Iterator<Item = PieceId> + '_ {
        self.links(piece).iter().map(|link| link.piece)
    }

    pub fn neighbor(&self, piece: PieceId, side: Side) -> Option<PieceId> {
        self.links(piece)
            .iter()
            .find(|link| link.side == side)
            .map(|link| link.piece)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &[Link])> + '_ {
        self.links
            .iter()
            .enumerate()
            .map(|(idx, links)| (PieceId::from_index(idx), links.as_slice()))
    }

    pub fn edge_count(&self) -> usize {
        self.links.iter().map(|links| links.len()).sum::<usize>() / 2
    }
}
