// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// An integer piece identifier tagged with the numbering it belongs to.
///
/// Two numberings exist side by side while a puzzle is processed: the generator's export ids
/// (sparse, arbitrary integers) and the canonical row-major ids (dense `0..N`). The tag keeps
/// them from being mixed up; both are plain `i64` values underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: i64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const fn new(value: i64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub const fn get(self) -> i64 {
        self.value
    }

    /// Formats the id the way id-keyed JSON documents spell their keys.
    pub fn key(self) -> String {
        itoa::Buffer::new().format(self.value).to_owned()
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(itoa::Buffer::new().format(self.value))
    }
}

impl<T> From<i64> for Id<T> {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdError::Empty);
        }
        trimmed
            .parse::<i64>()
            .map(Self::new)
            .map_err(|_| IdError::NotAnInteger {
                value: s.to_owned(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty,
    NotAnInteger { value: String },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("id must not be empty"),
            Self::NotAnInteger { value } => write!(f, "id {value:?} is not an integer"),
        }
    }
}

impl std::error::Error for IdError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceIdTag {}
/// Id as exported by the piece generator.
pub type SourceId = Id<SourceIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceIdTag {}
/// Canonical row-major id, dense in `0..N`.
pub type PieceId = Id<PieceIdTag>;

impl PieceId {
    pub fn from_index(index: usize) -> Self {
        Self::new(index as i64)
    }

    pub fn index(self) -> usize {
        self.value as usize
    }
}

#[cfg(test)]
mod tests {
    use super::{IdError, PieceId, SourceId};

    #[test]
    fn id_parses_trimmed_integers() {
        let id: SourceId = " 42 ".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.key(), "42");
    }

    #[test]
    fn id_rejects_empty() {
        assert_eq!("  ".parse::<SourceId>(), Err(IdError::Empty));
    }

    #[test]
    fn id_rejects_non_integers() {
        let err = "7a".parse::<SourceId>().unwrap_err();
        assert!(matches!(err, IdError::NotAnInteger { .. }));
    }

    #[test]
    fn piece_id_round_trips_through_index() {
        let id = PieceId::from_index(17);
        assert_eq!(id.index(), 17);
        assert_eq!(id.to_string(), "17");
    }
}
