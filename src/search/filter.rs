use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use strum::IntoEnumIterator;

use super::store::CourseMetadata;
use crate::extraction::{ExtractedFilters, FilterField};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Equals(String),
    MemberOf(Vec<String>),
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterLeaf {
    pub field: FilterField,
    pub condition: Condition,
}

impl FilterLeaf {
    pub fn equals(field: FilterField, value: impl Into<String>) -> Self {
        Self {
            field,
            condition: Condition::Equals(value.into()),
        }
    }

    pub fn member_of(field: FilterField, values: Vec<String>) -> Self {
        Self {
            field,
            condition: Condition::MemberOf(values),
        }
    }

    /// The compared value of an EQUALS leaf.
    pub fn equals_value(&self) -> Option<&str> {
        match &self.condition {
            Condition::Equals(value) => Some(value),
            Condition::MemberOf(_) => None,
        }
    }


    pub fn matches(&self, metadata: &CourseMetadata) -> bool {
        let actual = metadata.field(self.field);
        match &self.condition {
            Condition::Equals(expected) => actual == expected,
            Condition::MemberOf(allowed) => allowed.iter().any(|v| v == actual),
        }
    }


    pub fn to_json(&self) -> Value {
        let condition = match &self.condition {
            Condition::Equals(value) => json!({ "$eq": value }),
            Condition::MemberOf(values) => json!({ "$in": values }),
        };
        let mut object = Map::new();
        object.insert(self.field.as_str().to_string(), condition);
        Value::Object(object)
    }
}


/// A metadata constraint. A single leaf is always kept unwrapped; `And` always
/// holds at least two leaves. Use [`FilterQuery::from_leaves`] to keep that shape.
/// Deserialization goes through the same reshaping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "RawFilterQuery")]
pub enum FilterQuery {
    Leaf(FilterLeaf),
    And(Vec<FilterLeaf>),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawFilterQuery {
    Leaf(FilterLeaf),
    And(Vec<FilterLeaf>),
}

impl TryFrom<RawFilterQuery> for FilterQuery {
    type Error = String;

    fn try_from(raw: RawFilterQuery) -> Result<Self, Self::Error> {
        match raw {
            RawFilterQuery::Leaf(leaf) => Ok(FilterQuery::Leaf(leaf)),
            RawFilterQuery::And(leaves) => FilterQuery::from_leaves(leaves)
                .ok_or_else(|| "a conjunction needs at least one leaf".to_string()),
        }
    }
}

impl FilterQuery {
    /// `None` for no leaves, the bare leaf for one, a conjunction otherwise.
    pub fn from_leaves(mut leaves: Vec<FilterLeaf>) -> Option<Self> {
        match leaves.len() {
            0 => None,
            1 => leaves.pop().map(FilterQuery::Leaf),
            _ => Some(FilterQuery::And(leaves)),
        }
    }


    pub fn leaves(&self) -> &[FilterLeaf] {
        match self {
            FilterQuery::Leaf(leaf) => std::slice::from_ref(leaf),
            FilterQuery::And(leaves) => leaves,
        }
    }


    pub fn find(&self, field: FilterField) -> Option<&FilterLeaf> {
        self.leaves().iter().find(|leaf| leaf.field == field)
    }

    /// Splits off the first leaf on `field`. The remainder is reshaped, so
    /// removing from a two-leaf conjunction yields a bare leaf.
    pub fn split_off(&self, field: FilterField) -> Option<(FilterLeaf, Option<FilterQuery>)> {
        let position = self.leaves().iter().position(|leaf| leaf.field == field)?;

        let mut rest = self.leaves().to_vec();
        let removed = rest.remove(position);
        Some((removed, FilterQuery::from_leaves(rest)))
    }

    /// Appends `leaf` to an optional base filter under the same shape rules.
    pub fn combine(base: Option<FilterQuery>, leaf: FilterLeaf) -> FilterQuery {
        let mut leaves = match base {
            None => Vec::new(),
            Some(FilterQuery::Leaf(existing)) => vec![existing],
            Some(FilterQuery::And(existing)) => existing,
        };
        if leaves.is_empty() {
            return FilterQuery::Leaf(leaf);
        }
        leaves.push(leaf);
        FilterQuery::And(leaves)
    }


    pub fn matches(&self, metadata: &CourseMetadata) -> bool {
        self.leaves().iter().all(|leaf| leaf.matches(metadata))
    }

    /// Store dialect: `{"f": {"$eq": v}}`, `{"f": {"$in": [..]}}`, `{"$and": [..]}`.
    pub fn to_json(&self) -> Value {
        match self {
            FilterQuery::Leaf(leaf) => leaf.to_json(),
            FilterQuery::And(leaves) => {
                json!({ "$and": leaves.iter().map(FilterLeaf::to_json).collect::<Vec<_>>() })
            }
        }
    }
}


pub struct FilterBuilder;

impl FilterBuilder {
    /// One EQUALS leaf per present field, in [`FilterField`] order.
    pub fn build(filters: &ExtractedFilters) -> Option<FilterQuery> {
        let leaves = FilterField::iter()
            .filter_map(|field| filters.get(field).map(|value| FilterLeaf::equals(field, value)))
            .collect();

        FilterQuery::from_leaves(leaves)
    }
}
