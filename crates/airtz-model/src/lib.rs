//! Core value types for airport timezone reconciliation.
//!
//! Three keyed tables feed the reconciler:
//! - [`AirportTable`]: knowledge-base airport items keyed by ICAO code,
//! - [`TimezoneTable`]: knowledge-base IANA timezone items keyed by zone name,
//! - [`IcaoTimezoneTable`]: the local ICAO → IANA mapping.
//!
//! Each table owns its duplicate-key policy; they differ on purpose and are
//! documented on the respective `insert` methods.

pub mod entity_id;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub use entity_id::{parse_entity_id, strip_entity_prefix, EntityId, ITEM_PREFIX};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid entity id {raw:?}: expected `Q` followed by ASCII digits")]
    InvalidEntityId { raw: String },
    #[error("invalid airport selection: {0}")]
    InvalidSelection(String),
}

// ============================================================================
// Airports
// ============================================================================

/// An airport item as the knowledge base currently describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub entity: String,
    pub icao: String,
    pub name: String,
    /// Timezone item already attached to the airport, if any.
    pub timezone_entity: Option<String>,
    pub timezone_name: Option<String>,
}

impl Airport {
    pub fn has_timezone(&self) -> bool {
        self.timezone_entity.is_some()
    }
}

/// Airports keyed by ICAO code. Iteration is in ascending ICAO order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AirportTable {
    by_icao: BTreeMap<String, Airport>,
}

impl AirportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// First occurrence wins: a later row with the same ICAO code is dropped
    /// and `false` is returned.
    pub fn insert(&mut self, airport: Airport) -> bool {
        if self.by_icao.contains_key(&airport.icao) {
            return false;
        }
        self.by_icao.insert(airport.icao.clone(), airport);
        true
    }

    pub fn get(&self, icao: &str) -> Option<&Airport> {
        self.by_icao.get(icao)
    }

    pub fn get_mut(&mut self, icao: &str) -> Option<&mut Airport> {
        self.by_icao.get_mut(icao)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Airport> {
        self.by_icao.values()
    }

    pub fn len(&self) -> usize {
        self.by_icao.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_icao.is_empty()
    }
}

impl FromIterator<Airport> for AirportTable {
    fn from_iter<I: IntoIterator<Item = Airport>>(iter: I) -> Self {
        let mut table = Self::new();
        for airport in iter {
            table.insert(airport);
        }
        table
    }
}

// ============================================================================
// Timezones
// ============================================================================

/// IANA zone name → knowledge-base entity id (prefix already stripped).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimezoneTable {
    by_name: HashMap<String, String>,
}

impl TimezoneTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins; the query source is treated as authoritative.
    /// Returns the entity that was replaced, if any.
    pub fn insert(
        &mut self,
        zone_name: impl Into<String>,
        entity: impl Into<String>,
    ) -> Option<String> {
        self.by_name.insert(zone_name.into(), entity.into())
    }

    pub fn get(&self, zone_name: &str) -> Option<&str> {
        self.by_name.get(zone_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TimezoneTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, entity) in iter {
            table.insert(name, entity);
        }
        table
    }
}

/// ICAO code → IANA zone name, from the local mapping file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IcaoTimezoneTable {
    by_icao: HashMap<String, String>,
}

impl IcaoTimezoneTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// First occurrence wins; returns `false` when the code was already mapped.
    pub fn insert(&mut self, icao: impl Into<String>, zone_name: impl Into<String>) -> bool {
        let icao = icao.into();
        if self.by_icao.contains_key(&icao) {
            return false;
        }
        self.by_icao.insert(icao, zone_name.into());
        true
    }

    pub fn get(&self, icao: &str) -> Option<&str> {
        self.by_icao.get(icao).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_icao.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_icao.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IcaoTimezoneTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (icao, name) in iter {
            table.insert(icao, name);
        }
        table
    }
}

// ============================================================================
// Selection + pending facts
// ============================================================================

/// Which airports a run is allowed to touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Single(String),
    /// Explicit opt-in; never a default.
    All,
}

impl Selection {
    /// Build a selection from the two mutually exclusive command-line flags.
    ///
    /// Exactly one of `icao` / `all_airports` must be given.
    pub fn from_flags(icao: Option<&str>, all_airports: bool) -> Result<Self, ModelError> {
        match (icao, all_airports) {
            (Some(code), false) => {
                let code = code.trim();
                if code.is_empty() {
                    return Err(ModelError::InvalidSelection(
                        "ICAO code must not be empty".to_string(),
                    ));
                }
                Ok(Selection::Single(code.to_string()))
            }
            (None, true) => Ok(Selection::All),
            (Some(_), true) => Err(ModelError::InvalidSelection(
                "choose either a single ICAO code or all airports, not both".to_string(),
            )),
            (None, false) => Err(ModelError::InvalidSelection(
                "choose a single ICAO code or explicitly opt in to all airports".to_string(),
            )),
        }
    }

    pub fn matches(&self, icao: &str) -> bool {
        match self {
            Selection::Single(code) => code == icao,
            Selection::All => true,
        }
    }
}

/// A "located in time zone" claim that still has to be written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingFact {
    pub airport_entity: String,
    pub timezone_numeric_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(icao: &str, entity: &str) -> Airport {
        Airport {
            entity: entity.to_string(),
            icao: icao.to_string(),
            name: format!("{icao} airport"),
            timezone_entity: None,
            timezone_name: None,
        }
    }

    #[test]
    fn airport_table_keeps_first_row_per_icao() {
        let mut table = AirportTable::new();
        assert!(table.insert(airport("LOWW", "Q1")));
        assert!(!table.insert(airport("LOWW", "Q99")));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("LOWW").map(|a| a.entity.as_str()), Some("Q1"));
    }

    #[test]
    fn airport_table_iterates_in_icao_order() {
        let table: AirportTable = vec![
            airport("LOWW", "Q1"),
            airport("EDDF", "Q2"),
            airport("KJFK", "Q3"),
        ]
        .into_iter()
        .collect();
        let order: Vec<&str> = table.iter().map(|a| a.icao.as_str()).collect();
        assert_eq!(order, vec!["EDDF", "KJFK", "LOWW"]);
    }

    #[test]
    fn timezone_table_keeps_last_entity_per_name() {
        let mut table = TimezoneTable::new();
        assert_eq!(table.insert("Europe/Vienna", "Q2"), None);
        assert_eq!(table.insert("Europe/Vienna", "Q3"), Some("Q2".to_string()));
        assert_eq!(table.get("Europe/Vienna"), Some("Q3"));
    }

    #[test]
    fn icao_timezone_table_keeps_first_name_per_code() {
        let table: IcaoTimezoneTable = vec![("LOWW", "Europe/Vienna"), ("LOWW", "Europe/Berlin")]
            .into_iter()
            .collect();
        assert_eq!(table.get("LOWW"), Some("Europe/Vienna"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn selection_requires_exactly_one_flag() {
        assert_eq!(
            Selection::from_flags(Some("LOWW"), false),
            Ok(Selection::Single("LOWW".to_string()))
        );
        assert_eq!(Selection::from_flags(None, true), Ok(Selection::All));
        assert!(matches!(
            Selection::from_flags(Some("LOWW"), true),
            Err(ModelError::InvalidSelection(_))
        ));
        assert!(matches!(
            Selection::from_flags(None, false),
            Err(ModelError::InvalidSelection(_))
        ));
        assert!(Selection::from_flags(Some("  "), false).is_err());
    }

    #[test]
    fn selection_matching() {
        let single = Selection::Single("LOWW".to_string());
        assert!(single.matches("LOWW"));
        assert!(!single.matches("EDDF"));
        assert!(Selection::All.matches("EDDF"));
    }
}
