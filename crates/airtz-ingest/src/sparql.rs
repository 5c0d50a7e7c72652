//! SPARQL JSON result documents (`application/sparql-results+json`).
//!
//! Only the parts the loaders read are modelled: `results.bindings`, each row a
//! map of variable name → `{ "value": ... }`. Other keys (`type`, `xml:lang`,
//! `head`) are ignored.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::IngestError;

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResults {
    pub results: ResultSet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultSet {
    pub bindings: Vec<Row>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoundValue {
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub fields: BTreeMap<String, BoundValue>,
}

impl QueryResults {
    pub fn from_json_str(text: &str) -> Result<Self, IngestError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn rows(&self) -> &[Row] {
        &self.results.bindings
    }
}

impl Row {
    /// Value of a variable the query always binds. `index` is only used for the error.
    pub fn required(&self, index: usize, field: &str) -> Result<&str, IngestError> {
        self.optional(field).ok_or_else(|| IngestError::MissingField {
            row: index,
            field: field.to_string(),
        })
    }

    /// Value of an `OPTIONAL { ... }` variable; unbound means absent.
    pub fn optional(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(|v| v.value.as_str())
    }
}
