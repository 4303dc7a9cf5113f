// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{Map, Value};

use super::ids::SourceId;

/// Bounding box of a piece in source image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceBounds {
    pub ox: f64,
    pub oy: f64,
    pub ow: f64,
    pub oh: f64,
}

impl PieceBounds {
    pub fn new(ox: f64, oy: f64, ow: f64, oh: f64) -> Self {
        Self { ox, oy, ow, oh }
    }

    /// Vertical center of the box; the only signal used for row clustering.
    pub fn mid_y(&self) -> f64 {
        self.oy + self.oh / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieceRecord {
    id: SourceId,
    bounds: PieceBounds,
    attributes: Map<String, Value>,
}

impl PieceRecord {
    pub fn new(id: SourceId, bounds: PieceBounds) -> Self {
        Self {
            id,
            bounds,
            attributes: Map::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn bounds(&self) -> &PieceBounds {
        &self.bounds
    }

    pub fn mid_y(&self) -> f64 {
        self.bounds.mid_y()
    }

    /// Attributes other than `id` and the bounding box, in document order.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}
