// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pure id substitution over artifact contents.
//!
//! Every function takes a [`Translation`], so the same code renumbers an artifact and, with the
//! inverse translation, restores it.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

use crate::catalog::{parse_id_value, PIECE_PROPERTIES_KEY};
use crate::model::{AdjacencyGraph, Translation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RekeyError {
    /// The artifact mentions an id the translation does not know.
    UnmappedId { id: i64 },
    /// The translation knows an id the artifact has no entry for.
    MissingEntry { id: i64 },
    InvalidKey { key: String },
    DuplicateKey { key: String },
    InvalidRecord { index: usize },
    NotAnObject,
    MissingField { field: &'static str },
}

impl fmt::Display for RekeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmappedId { id } => write!(f, "id {id} has no entry in the rename map"),
            Self::MissingEntry { id } => write!(f, "no entry for mapped id {id}"),
            Self::InvalidKey { key } => write!(f, "key {key:?} is not an integer id"),
            Self::DuplicateKey { key } => write!(f, "key {key:?} repeats an earlier id"),
            Self::InvalidRecord { index } => {
                write!(f, "record #{index} is not an object with an integer `id`")
            }
            Self::NotAnObject => f.write_str("document is not a json object"),
            Self::MissingField { field } => write!(f, "document has no `{field}` array"),
        }
    }
}

impl std::error::Error for RekeyError {}

fn check_complete(
    translation: &Translation<'_>,
    seen: &HashSet<i64>,
) -> Result<(), RekeyError> {
    if seen.len() == translation.len() {
        return Ok(());
    }
    match translation.domain().find(|id| !seen.contains(id)) {
        Some(id) => Err(RekeyError::MissingEntry { id }),
        None => Ok(()),
    }
}

/// Re-keys an object keyed by stringified ids. Values are untouched; keys come out in ascending
/// numeric order.
pub fn rekey_object(
    data: &Map<String, Value>,
    translation: &Translation<'_>,
) -> Result<Map<String, Value>, RekeyError> {
    let mut seen = HashSet::with_capacity(data.len());
    let mut rekeyed = BTreeMap::new();
    for (key, value) in data {
        let id = key
            .parse::<i64>()
            .map_err(|_| RekeyError::InvalidKey { key: key.clone() })?;
        if !seen.insert(id) {
            return Err(RekeyError::DuplicateKey { key: key.clone() });
        }
        let new = translation
            .translate(id)
            .ok_or(RekeyError::UnmappedId { id })?;
        rekeyed.insert(new, value.clone());
    }
    check_complete(translation, &seen)?;

    let mut buf = itoa::Buffer::new();
    Ok(rekeyed
        .into_iter()
        .map(|(id, value)| (buf.format(id).to_owned(), value))
        .collect())
}

/// Rewrites the `id` of every record and sorts the records by their new id. An id keeps its JSON
/// representation: numbers stay numbers, strings stay strings.
pub fn rekey_piece_properties(
    records: &[Value],
    translation: &Translation<'_>,
) -> Result<Vec<Value>, RekeyError> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut rekeyed = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let Some(object) = record.as_object() else {
            return Err(RekeyError::InvalidRecord { index });
        };
        let Some(raw) = object.get("id") else {
            return Err(RekeyError::InvalidRecord { index });
        };
        let id = parse_id_value(raw).ok_or(RekeyError::InvalidRecord { index })?;
        if !seen.insert(id) {
            return Err(RekeyError::DuplicateKey {
                key: id.to_string(),
            });
        }
        let new = translation
            .translate(id)
            .ok_or(RekeyError::UnmappedId { id })?;

        let mut object = object.clone();
        let new_value = match raw {
            Value::String(_) => Value::String(itoa::Buffer::new().format(new).to_owned()),
            _ => Value::from(new),
        };
        object.insert("id".to_owned(), new_value);
        rekeyed.push((new, Value::Object(object)));
    }
    check_complete(translation, &seen)?;

    rekeyed.sort_by_key(|(id, _)| *id);
    Ok(rekeyed.into_iter().map(|(_, record)| record).collect())
}

/// Rewrites `piece_properties` inside an `index.json` document; other keys are kept as-is.
pub fn rekey_index_document(doc: &Value, translation: &Translation<'_>) -> Result<Value, RekeyError> {
    let Some(root) = doc.as_object() else {
        return Err(RekeyError::NotAnObject);
    };
    let Some(records) = root.get(PIECE_PROPERTIES_KEY).and_then(Value::as_array) else {
        return Err(RekeyError::MissingField {
            field: PIECE_PROPERTIES_KEY,
        });
    };
    let records = rekey_piece_properties(records, translation)?;

    let mut root = root.clone();
    root.insert(PIECE_PROPERTIES_KEY.to_owned(), Value::Array(records));
    Ok(Value::Object(root))
}

/// New file name for a per-piece asset named `<id>.<ext>`.
///
/// Returns `Ok(None)` when the stem is not an integer; such files are not keyed by id.
pub fn renamed_asset_name(
    file_name: &str,
    translation: &Translation<'_>,
) -> Result<Option<String>, RekeyError> {
    let path = Path::new(file_name);
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return Ok(None);
    };
    let Ok(id) = stem.parse::<i64>() else {
        return Ok(None);
    };
    let new = translation
        .translate(id)
        .ok_or(RekeyError::UnmappedId { id })?;

    let mut name = itoa::Buffer::new().format(new).to_owned();
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        name.push('.');
        name.push_str(ext);
    }
    Ok(Some(name))
}

/// The adjacency graph as `adjacent.json` spells it: stringified ids, ascending keys, neighbors
/// in left, up, right, down order.
pub fn adjacency_document(graph: &AdjacencyGraph) -> Value {
    let mut doc = Map::with_capacity(graph.len());
    for (id, _) in graph.iter() {
        let neighbors = graph
            .neighbors(id)
            .map(|n| Value::String(n.key()))
            .collect::<Vec<_>>();
        doc.insert(id.key(), Value::Array(neighbors));
    }
    Value::Object(doc)
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::{json, Value};

    use super::{
        adjacency_document, rekey_index_document, rekey_object, renamed_asset_name, RekeyError,
    };
    use crate::layout::{plan_puzzle, TolerancePolicy};
    use crate::model::{fixtures, RenameMap, SourceId};

    #[fixture]
    fn rename() -> RenameMap {
        RenameMap::from_canonical_order([7, 3, 9, 1].map(SourceId::new)).unwrap()
    }

    #[rstest]
    fn rekeys_objects_in_numeric_key_order(rename: RenameMap) {
        let data = json!({"1": "d", "3": "b", "7": "a", "9": "c"});
        let out = rekey_object(data.as_object().unwrap(), &rename.forward()).unwrap();
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["0", "1", "2", "3"]);
        assert_eq!(Value::Object(out), json!({"0": "a", "1": "b", "2": "c", "3": "d"}));
    }

    #[rstest]
    fn keys_sort_numerically_not_lexically() {
        let order = (0..12).rev().map(SourceId::new).collect::<Vec<_>>();
        let rename = RenameMap::from_canonical_order(order).unwrap();
        let data = (0..12)
            .map(|id| (id.to_string(), Value::from(id)))
            .collect::<serde_json::Map<_, _>>();
        let out = rekey_object(&data, &rename.forward()).unwrap();
        let keys = out.keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys[..3], ["0", "1", "2"]);
        assert_eq!(keys[10..], ["10", "11"]);
        assert_eq!(out["0"], json!(11));
    }

    #[rstest]
    #[case::unmapped(json!({"1": 0, "3": 0, "7": 0, "9": 0, "8": 0}), RekeyError::UnmappedId { id: 8 })]
    #[case::missing(json!({"1": 0, "3": 0, "9": 0}), RekeyError::MissingEntry { id: 7 })]
    #[case::invalid(json!({"x": 0}), RekeyError::InvalidKey { key: "x".to_owned() })]
    #[case::duplicate(json!({"01": 0, "1": 0}), RekeyError::DuplicateKey { key: "1".to_owned() })]
    fn rekey_object_reports_mismatches(
        rename: RenameMap,
        #[case] data: Value,
        #[case] expected: RekeyError,
    ) {
        let err = rekey_object(data.as_object().unwrap(), &rename.forward()).unwrap_err();
        assert_eq!(err, expected);
    }

    #[rstest]
    fn index_rekey_preserves_id_representation_and_other_keys(rename: RenameMap) {
        let doc = json!({
            "version": 2,
            "piece_properties": [
                {"id": 1, "ox": 10, "oy": 10, "ow": 10, "oh": 10, "rotate": 0},
                {"id": "7", "ox": 0, "oy": 0, "ow": 10, "oh": 10},
                {"id": 9, "ox": 0, "oy": 10, "ow": 10, "oh": 10},
                {"id": 3, "ox": 10, "oy": 0, "ow": 10, "oh": 10}
            ],
            "image_width": 20
        });

        let out = rekey_index_document(&doc, &rename.forward()).unwrap();
        let ids = out["piece_properties"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].clone())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![json!("0"), json!(1), json!(2), json!(3)]);
        assert_eq!(out["piece_properties"][3]["rotate"], json!(0));
        assert_eq!(out["version"], json!(2));
        assert_eq!(out["image_width"], json!(20));
        let keys = out.as_object().unwrap().keys().collect::<Vec<_>>();
        assert_eq!(keys, vec!["version", "piece_properties", "image_width"]);
    }

    #[rstest]
    fn forward_then_inverse_restores_artifacts(rename: RenameMap) {
        let mask = json!({"1": "m-1.png", "3": "m-3.png", "7": "m-7.png", "9": "m-9.png"});
        let there = rekey_object(mask.as_object().unwrap(), &rename.forward()).unwrap();
        let back = rekey_object(&there, &rename.inverse()).unwrap();
        assert_eq!(Value::Object(back), mask);

        // Records sorted by old id come back in the same order.
        let index = json!({"piece_properties": [
            {"id": 1, "ox": 10, "oy": 10, "ow": 10, "oh": 10},
            {"id": 3, "ox": 10, "oy": 0, "ow": 10, "oh": 10},
            {"id": "7", "ox": 0, "oy": 0, "ow": 10, "oh": 10},
            {"id": 9, "ox": 0, "oy": 10, "ow": 10, "oh": 10}
        ]});
        let there = rekey_index_document(&index, &rename.forward()).unwrap();
        assert_ne!(there, index);
        let back = rekey_index_document(&there, &rename.inverse()).unwrap();
        assert_eq!(back, index);
    }

    #[rstest]
    #[case::png("7.png", Some("0.png"))]
    #[case::no_extension("9", Some("2"))]
    #[case::not_an_id("cut_proof.html", None)]
    #[case::double_extension("3.tar.gz", None)]
    fn asset_names_follow_the_rename(
        rename: RenameMap,
        #[case] name: &str,
        #[case] expected: Option<&str>,
    ) {
        let renamed = renamed_asset_name(name, &rename.forward()).unwrap();
        assert_eq!(renamed.as_deref(), expected);
    }

    #[rstest]
    fn unmapped_asset_names_are_errors(rename: RenameMap) {
        let err = renamed_asset_name("12.png", &rename.forward()).unwrap_err();
        assert_eq!(err, RekeyError::UnmappedId { id: 12 });
    }

    #[test]
    fn adjacency_document_uses_string_ids() {
        let plan = plan_puzzle(&fixtures::four_piece_square(), &TolerancePolicy::default()).unwrap();
        let doc = adjacency_document(plan.adjacency());
        assert_eq!(
            doc,
            json!({"0": ["1", "2"], "1": ["0", "3"], "2": ["0", "3"], "3": ["2", "1"]})
        );
    }
}
