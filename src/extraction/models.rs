use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};


/// Metadata fields a query can constrain. Declaration order is the order in
/// which filters are built.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterField {
    University,
    College,
    Department,
    Grade,
    Semester,
}

impl FilterField {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}


/// Sparse field -> value map. Absent fields are omitted, never stored empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedFilters {
    fields: BTreeMap<FilterField, String>,
}

impl ExtractedFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank values are ignored.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.fields.insert(field, value);
        }
    }


    pub fn with(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }


    pub fn get(&self, field: FilterField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }


    pub fn contains(&self, field: FilterField) -> bool {
        self.fields.contains_key(&field)
    }


    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }


    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Present fields in build order.
    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &str)> {
        self.fields.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Fields present in `overrides` replace ours.
    pub fn merged_with(mut self, overrides: &ExtractedFilters) -> Self {
        for (field, value) in overrides.iter() {
            self.set(field, value);
        }
        self
    }
}

impl FromIterator<(FilterField, String)> for ExtractedFilters {
    fn from_iter<I: IntoIterator<Item = (FilterField, String)>>(iter: I) -> Self {
        let mut filters = Self::new();
        for (field, value) in iter {
            filters.set(field, value);
        }
        filters
    }
}
