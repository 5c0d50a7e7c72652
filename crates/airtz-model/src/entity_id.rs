//! Entity-id codec.
//!
//! The knowledge base exposes items as URIs (`http://www.wikidata.org/entity/Q42`).
//! Loaders strip the URI prefix; this module turns the remaining `Q42` into its
//! numeric id. Anything that is not `Q` followed by ASCII digits is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Prefix letter of knowledge-base items.
pub const ITEM_PREFIX: char = 'Q';

/// Numeric id of a knowledge-base item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    pub fn numeric(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ITEM_PREFIX}{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_entity_id(s).map(EntityId)
    }
}

/// Parse `Q<digits>` into its numeric id.
pub fn parse_entity_id(raw: &str) -> Result<u64, ModelError> {
    let invalid = || ModelError::InvalidEntityId {
        raw: raw.to_string(),
    };

    let digits = raw.strip_prefix(ITEM_PREFIX).ok_or_else(invalid)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    // All-digit input can still overflow u64.
    digits.parse::<u64>().map_err(|_| invalid())
}

/// Remove the entity URI prefix when present; other strings pass through unchanged.
pub fn strip_entity_prefix<'a>(raw: &'a str, prefix: &str) -> &'a str {
    raw.strip_prefix(prefix).unwrap_or(raw)
}
