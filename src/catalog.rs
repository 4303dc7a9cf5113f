// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Piece catalog loading.
//!
//! A catalog is the `piece_properties` array of a puzzle's `index.json`, parsed into typed
//! records. Parsing is pure; reading the file is the store's job.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::{Map, Value};

use crate::model::{PieceBounds, PieceRecord, SourceId};

pub const PIECE_PROPERTIES_KEY: &str = "piece_properties";

const BOUND_FIELDS: [&str; 4] = ["ox", "oy", "ow", "oh"];

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pieces: Vec<PieceRecord>,
    by_id: HashMap<SourceId, usize>,
}

impl Catalog {
    pub fn from_index_str(raw: &str) -> Result<Self, CatalogError> {
        let doc: Value =
            serde_json::from_str(raw).map_err(|err| CatalogError::MissingCatalog {
                reason: format!("invalid json: {err}"),
            })?;
        Self::from_index_json(&doc)
    }

    pub fn from_index_json(doc: &Value) -> Result<Self, CatalogError> {
        let Some(root) = doc.as_object() else {
            return Err(CatalogError::MissingCatalog {
                reason: "index document is not a json object".to_owned(),
            });
        };
        let Some(records) = root.get(PIECE_PROPERTIES_KEY).and_then(Value::as_array) else {
            return Err(CatalogError::MissingCatalog {
                reason: format!("index document has no `{PIECE_PROPERTIES_KEY}` array"),
            });
        };
        Self::from_records(records)
    }

    pub fn from_records(records: &[Value]) -> Result<Self, CatalogError> {
        let pieces = records
            .iter()
            .enumerate()
            .map(|(index, record)| parse_record(index, record))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_pieces(pieces)
    }

    pub fn from_pieces(pieces: Vec<PieceRecord>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(pieces.len());
        for (index, piece) in pieces.iter().enumerate() {
            if let Some(first_index) = by_id.insert(piece.id(), index) {
                return Err(CatalogError::DuplicateId {
                    id: piece.id(),
                    first_index,
                    index,
                });
            }
        }
        Ok(Self { pieces, by_id })
    }

    /// Records in source (export) order.
    pub fn pieces(&self) -> &[PieceRecord] {
        &self.pieces
    }

    pub fn get(&self, id: SourceId) -> Option<&PieceRecord> {
        self.by_id.get(&id).map(|&idx| &self.pieces[idx])
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn heights(&self) -> impl Iterator<Item = f64> + '_ {
        self.pieces.iter().map(|p| p.bounds().oh)
    }

    pub fn mid_y_by_id(&self) -> BTreeMap<SourceId, f64> {
        self.pieces.iter().map(|p| (p.id(), p.mid_y())).collect()
    }
}

/// Reads an id the way the generator writes it: a JSON integer, an integral float, or a string
/// holding an integer.
pub fn parse_id_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_record(index: usize, record: &Value) -> Result<PieceRecord, CatalogError> {
    let Some(object) = record.as_object() else {
        return Err(CatalogError::MalformedRecord {
            index,
            field: None,
            problem: RecordProblem::NotAnObject,
        });
    };

    let id = match object.get("id") {
        None => return Err(malformed(index, "id", RecordProblem::Missing)),
        Some(raw) => parse_id_value(raw)
            .map(SourceId::new)
            .ok_or_else(|| malformed(index, "id", RecordProblem::NotAnInteger))?,
    };

    let mut bounds = [0.0f64; 4];
    for (slot, field) in bounds.iter_mut().zip(BOUND_FIELDS) {
        *slot = match object.get(field) {
            None => return Err(malformed(index, field, RecordProblem::Missing)),
            Some(raw) => raw
                .as_f64()
                .ok_or_else(|| malformed(index, field, RecordProblem::NotNumeric))?,
        };
    }
    let [ox, oy, ow, oh] = bounds;

    let attributes = object
        .iter()
        .filter(|(key, _)| key.as_str() != "id" && !BOUND_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect::<Map<_, _>>();

    Ok(PieceRecord::new(id, PieceBounds::new(ox, oy, ow, oh)).with_attributes(attributes))
}

fn malformed(index: usize, field: &'static str, problem: RecordProblem) -> CatalogError {
    CatalogError::MalformedRecord {
        index,
        field: Some(field),
        problem,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordProblem {
    NotAnObject,
    Missing,
    NotNumeric,
    NotAnInteger,
}

impl fmt::Display for RecordProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotAnObject => "is not a json object",
            Self::Missing => "is missing",
            Self::NotNumeric => "is not numeric",
            Self::NotAnInteger => "is not an integer",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    MissingCatalog {
        reason: String,
    },
    MalformedRecord {
        index: usize,
        field: Option<&'static str>,
        problem: RecordProblem,
    },
    DuplicateId {
        id: SourceId,
        first_index: usize,
        index: usize,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCatalog { reason } => write!(f, "missing piece catalog: {reason}"),
            Self::MalformedRecord {
                index,
                field: Some(field),
                problem,
            } => write!(f, "piece record #{index}: field `{field}` {problem}"),
            Self::MalformedRecord {
                index,
                field: None,
                problem,
            } => write!(f, "piece record #{index} {problem}"),
            Self::DuplicateId {
                id,
                first_index,
                index,
            } => write!(
                f,
                "piece id {id} appears in records #{first_index} and #{index}"
            ),
        }
    }
}

impl std::error::Error for CatalogError {}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{Catalog, CatalogError, RecordProblem};
    use crate::model::SourceId;

    #[test]
    fn parses_records_and_keeps_pass_through_attributes() {
        let doc = json!({
            "version": 3,
            "piece_properties": [
                {"id": 7, "ox": 0, "oy": 0, "ow": 10, "oh": 12, "rotate": 90, "s": 0.5},
                {"id": "3", "ox": 10.5, "oy": 0, "ow": 10, "oh": 10}
            ]
        });

        let catalog = Catalog::from_index_json(&doc).unwrap();
        assert_eq!(catalog.len(), 2);

        let first = &catalog.pieces()[0];
        assert_eq!(first.id(), SourceId::new(7));
        assert_eq!(first.mid_y(), 6.0);
        assert_eq!(first.attributes().keys().collect::<Vec<_>>(), vec!["rotate", "s"]);

        let second = catalog.get(SourceId::new(3)).unwrap();
        assert_eq!(second.bounds().ox, 10.5);
        assert!(second.attributes().is_empty());

        let mid = catalog.mid_y_by_id();
        assert_eq!(mid[&SourceId::new(3)], 5.0);
    }

    #[rstest]
    #[case::not_json("{not json")]
    #[case::not_an_object("[1, 2, 3]")]
    #[case::no_piece_properties(r#"{"pieces": []}"#)]
    #[case::piece_properties_not_array(r#"{"piece_properties": {"0": {}}}"#)]
    fn rejects_absent_or_malformed_sources(#[case] raw: &str) {
        let err = Catalog::from_index_str(raw).unwrap_err();
        assert!(matches!(err, CatalogError::MissingCatalog { .. }), "{err:?}");
    }

    #[rstest]
    #[case::missing_oh(r#"{"id": 1, "ox": 0, "oy": 0, "ow": 1}"#, Some("oh"), RecordProblem::Missing)]
    #[case::string_ox(r#"{"id": 1, "ox": "0", "oy": 0, "ow": 1, "oh": 1}"#, Some("ox"), RecordProblem::NotNumeric)]
    #[case::fractional_id(r#"{"id": 1.5, "ox": 0, "oy": 0, "ow": 1, "oh": 1}"#, Some("id"), RecordProblem::NotAnInteger)]
    #[case::missing_id(r#"{"ox": 0, "oy": 0, "ow": 1, "oh": 1}"#, Some("id"), RecordProblem::Missing)]
    #[case::not_object("42", None, RecordProblem::NotAnObject)]
    fn rejects_malformed_records(
        #[case] record: &str,
        #[case] field: Option<&'static str>,
        #[case] problem: RecordProblem,
    ) {
        let raw = format!(
            r#"{{"piece_properties": [{{"id": 0, "ox": 0, "oy": 0, "ow": 1, "oh": 1}}, {record}]}}"#
        );
        let err = Catalog::from_index_str(&raw).unwrap_err();
        assert_eq!(
            err,
            CatalogError::MalformedRecord {
                index: 1,
                field,
                problem
            }
        );
    }

    #[test]
    fn rejects_duplicate_ids() {
        let raw = r#"{"piece_properties": [
            {"id": 4, "ox": 0, "oy": 0, "ow": 1, "oh": 1},
            {"id": "4", "ox": 1, "oy": 0, "ow": 1, "oh": 1}
        ]}"#;
        let err = Catalog::from_index_str(raw).unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateId {
                id: SourceId::new(4),
                first_index: 0,
                index: 1
            }
        );
    }

    #[test]
    fn accepts_an_empty_record_set() {
        let catalog = Catalog::from_index_str(r#"{"piece_properties": []}"#).unwrap();
        assert!(catalog.is_empty());
    }
}
