//! Pipeline-as-data query model.
//!
//! The backing store's native query capability is an ordered pipeline, not
//! SQL joins. Each query is therefore a typed, composable list of stage
//! value-objects that adapters execute in order. Keeping stages as data makes
//! every plan loggable and testable without a store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One step in an ordered aggregation plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Left outer join: for each input document, collect documents of `from`
    /// whose `foreign_field` equals the local value (or any element of it,
    /// when the local field is an array) into `as_field`.
    Lookup {
        from: String,
        local_field: String,
        foreign_field: String,
        as_field: String,
    },
    /// Flatten an array field: one output document per element, with the
    /// field replaced by that element. Documents where the field is missing
    /// or empty are dropped.
    Unwind { path: String },
    /// Group documents by a key and fold accumulators over each group.
    Group {
        key: GroupKey,
        accumulators: Vec<Accumulator>,
    },
    /// Keep only documents matching the filter.
    Match(Filter),
    /// Stable sort on a single field. Ties keep their prior order.
    Sort { field: String, order: SortOrder },
    /// Truncate the result set.
    Limit(usize),
}

impl Stage {
    pub fn lookup(from: &str, local_field: &str, foreign_field: &str, as_field: &str) -> Self {
        Stage::Lookup {
            from: from.to_string(),
            local_field: local_field.to_string(),
            foreign_field: foreign_field.to_string(),
            as_field: as_field.to_string(),
        }
    }

    pub fn unwind(path: &str) -> Self {
        Stage::Unwind {
            path: path.to_string(),
        }
    }

    pub fn group(key: GroupKey, accumulators: Vec<Accumulator>) -> Self {
        Stage::Group { key, accumulators }
    }

    pub fn sort(field: &str, order: SortOrder) -> Self {
        Stage::Sort {
            field: field.to_string(),
            order,
        }
    }

    pub fn limit(count: usize) -> Self {
        Stage::Limit(count)
    }
}

/// Grouping key of a [`Stage::Group`].
///
/// The grouped output carries the key under `_id`: the plain field value for
/// [`GroupKey::Field`], an object of alias → value for [`GroupKey::Compound`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Field(String),
    Compound(BTreeMap<String, String>),
}

impl GroupKey {
    pub fn field(path: &str) -> Self {
        GroupKey::Field(path.to_string())
    }

    pub fn compound<'a>(parts: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        GroupKey::Compound(
            parts
                .into_iter()
                .map(|(alias, path)| (alias.to_string(), path.to_string()))
                .collect(),
        )
    }
}

/// Aggregate folded over each group of a [`Stage::Group`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accumulator {
    /// Sum the numeric values at `path` across the group into field `into`.
    Sum { path: String, into: String },
}

impl Accumulator {
    pub fn sum(path: &str, into: &str) -> Self {
        Accumulator::Sum {
            path: path.to_string(),
            into: into.to_string(),
        }
    }
}

/// Predicate of a [`Stage::Match`].
///
/// Paths traverse nested objects with `.` and fan out across arrays, so a
/// predicate on `items.dateOfPurchase` sees one value per joined item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// The value set at `path` contains every requested value. Extras are
    /// allowed: this is a superset test, not equality.
    ContainsAll { path: String, values: Vec<String> },
    /// At least one value at `path` is present and non-null.
    AnyNotNull { path: String },
    /// At least one numeric value at `path` strictly exceeds the threshold.
    Gt { path: String, threshold: f64 },
}

/// Sort direction of a [`Stage::Sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_serialize_with_snake_case_tags() {
        let stage = Stage::lookup("genres", "genreIds", "_id", "genres");
        let json = serde_json::to_value(&stage).expect("serialize stage");
        assert!(json.get("lookup").is_some());
    }

    #[test]
    fn compound_key_orders_aliases() {
        let key = GroupKey::compound([("itemId", "_id"), ("price", "price")]);
        let GroupKey::Compound(parts) = &key else {
            panic!("expected compound key");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts.get("itemId").map(String::as_str), Some("_id"));
    }
}
