//! Pipeline executor over in-memory collections.
//!
//! Path resolution descends nested objects with `.` and fans out across
//! arrays, so `items.dateOfPurchase` yields one leaf per joined item. A
//! trailing array expands into its elements. Unwind operates on top-level
//! fields, which is where joined arrays land.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Number, Value};

use shelfgen_core::{Accumulator, Document, Filter, GroupKey, ID_FIELD, Result, SortOrder, Stage};

pub(crate) fn execute_pipeline(
    collections: &BTreeMap<String, Vec<Document>>,
    source: &str,
    pipeline: &[Stage],
) -> Result<Vec<Document>> {
    let mut docs = collections.get(source).cloned().unwrap_or_default();
    for stage in pipeline {
        docs = apply_stage(collections, docs, stage)?;
    }
    Ok(docs)
}

fn apply_stage(
    collections: &BTreeMap<String, Vec<Document>>,
    mut docs: Vec<Document>,
    stage: &Stage,
) -> Result<Vec<Document>> {
    match stage {
        Stage::Lookup {
            from,
            local_field,
            foreign_field,
            as_field,
        } => Ok(lookup(
            collections,
            docs,
            from,
            local_field,
            foreign_field,
            as_field,
        )),
        Stage::Unwind { path } => Ok(unwind(docs, path)),
        Stage::Group { key, accumulators } => group(docs, key, accumulators),
        Stage::Match(filter) => Ok(docs
            .into_iter()
            .filter(|doc| matches_filter(doc, filter))
            .collect()),
        Stage::Sort { field, order } => Ok(sorted(docs, field, *order)),
        Stage::Limit(count) => {
            docs.truncate(*count);
            Ok(docs)
        }
    }
}

fn lookup(
    collections: &BTreeMap<String, Vec<Document>>,
    docs: Vec<Document>,
    from: &str,
    local_field: &str,
    foreign_field: &str,
    as_field: &str,
) -> Vec<Document> {
    let foreign: &[Document] = collections.get(from).map(Vec::as_slice).unwrap_or(&[]);
    docs.into_iter()
        .map(|mut doc| {
            let locals: Vec<Value> = leaf_values(&doc, local_field)
                .into_iter()
                .cloned()
                .collect();
            let joined: Vec<Value> = foreign
                .iter()
                .filter(|candidate| {
                    leaf_values(candidate, foreign_field)
                        .into_iter()
                        .any(|leaf| locals.iter().any(|local| local == leaf))
                })
                .map(|candidate| Value::Object(candidate.clone()))
                .collect();
            doc.insert(as_field.to_string(), Value::Array(joined));
            doc
        })
        .collect()
}

fn unwind(docs: Vec<Document>, path: &str) -> Vec<Document> {
    let mut out = Vec::new();
    for doc in docs {
        let Some(Value::Array(elements)) = doc.get(path).cloned() else {
            continue;
        };
        for element in elements {
            let mut copy = doc.clone();
            copy.insert(path.to_string(), element);
            out.push(copy);
        }
    }
    out
}

fn group(
    docs: Vec<Document>,
    key: &GroupKey,
    accumulators: &[Accumulator],
) -> Result<Vec<Document>> {
    // first-seen group order keeps output deterministic before any sort
    let mut order: Vec<String> = Vec::new();
    let mut entries: HashMap<String, (Value, Vec<f64>)> = HashMap::new();

    for doc in &docs {
        let key_value = group_key_value(doc, key);
        let map_key = serde_json::to_string(&key_value)?;
        let entry = entries.entry(map_key.clone()).or_insert_with(|| {
            order.push(map_key);
            (key_value, vec![0.0; accumulators.len()])
        });
        for (slot, accumulator) in accumulators.iter().enumerate() {
            let Accumulator::Sum { path, .. } = accumulator;
            for leaf in leaf_values(doc, path) {
                if let Some(number) = leaf.as_f64() {
                    entry.1[slot] += number;
                }
            }
        }
    }

    let mut out = Vec::with_capacity(order.len());
    for map_key in &order {
        let Some((key_value, sums)) = entries.remove(map_key) else {
            continue;
        };
        let mut doc = Map::new();
        doc.insert(ID_FIELD.to_string(), key_value);
        for (slot, accumulator) in accumulators.iter().enumerate() {
            let Accumulator::Sum { into, .. } = accumulator;
            let number = Number::from_f64(sums[slot]).unwrap_or_else(|| Number::from(0));
            doc.insert(into.clone(), Value::Number(number));
        }
        out.push(doc);
    }
    Ok(out)
}

fn group_key_value(doc: &Document, key: &GroupKey) -> Value {
    match key {
        GroupKey::Field(path) => first_leaf(doc, path).cloned().unwrap_or(Value::Null),
        GroupKey::Compound(parts) => {
            let mut object = Map::new();
            for (alias, path) in parts {
                object.insert(
                    alias.clone(),
                    first_leaf(doc, path).cloned().unwrap_or(Value::Null),
                );
            }
            Value::Object(object)
        }
    }
}

fn matches_filter(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::ContainsAll { path, values } => {
            let present: Vec<&str> = leaf_values(doc, path)
                .into_iter()
                .filter_map(Value::as_str)
                .collect();
            values
                .iter()
                .all(|value| present.contains(&value.as_str()))
        }
        Filter::AnyNotNull { path } => leaf_values(doc, path)
            .into_iter()
            .any(|leaf| !leaf.is_null()),
        Filter::Gt { path, threshold } => leaf_values(doc, path)
            .into_iter()
            .filter_map(Value::as_f64)
            .any(|number| number > *threshold),
    }
}

fn sorted(mut docs: Vec<Document>, field: &str, order: SortOrder) -> Vec<Document> {
    docs.sort_by(|a, b| {
        let ordering = compare_values(first_leaf(a, field), first_leaf(b, field));
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
    docs
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let ranks = (rank(a), rank(b));
    if ranks.0 != ranks.1 {
        return ranks.0.cmp(&ranks.1);
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .unwrap_or(0.0)
            .total_cmp(&y.as_f64().unwrap_or(0.0)),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

fn leaf_values<'a>(doc: &'a Document, path: &str) -> Vec<&'a Value> {
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return Vec::new();
    };
    let mut frontier: Vec<&Value> = match doc.get(first) {
        Some(value) => vec![value],
        None => return Vec::new(),
    };

    for segment in segments {
        let mut next = Vec::new();
        for value in frontier {
            match value {
                Value::Object(map) => {
                    if let Some(inner) = map.get(segment) {
                        next.push(inner);
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        if let Some(inner) = item.as_object().and_then(|map| map.get(segment)) {
                            next.push(inner);
                        }
                    }
                }
                _ => {}
            }
        }
        frontier = next;
    }

    let mut leaves = Vec::new();
    for value in frontier {
        match value {
            Value::Array(items) => leaves.extend(items.iter()),
            other => leaves.push(other),
        }
    }
    leaves
}

fn first_leaf<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    leaf_values(doc, path).into_iter().next()
}
