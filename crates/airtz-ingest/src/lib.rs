//! Source loaders for airtz.
//!
//! Turns the three raw inputs into keyed tables:
//! - IANA timezone items from a query result ([`load_timezone_table`]),
//! - airport items from a query result ([`load_airport_table`]),
//! - the local ICAO mapping file ([`load_icao_timezone_file`]).
//!
//! [`aip`] produces that mapping file from AIP airport directory text.
//!
//! Loaders only read; nothing here writes to the knowledge base.

pub mod aip;
pub mod icao_file;
pub mod source;
pub mod sparql;

use std::path::PathBuf;

use airtz_model::{strip_entity_prefix, Airport, AirportTable, TimezoneTable};

pub use aip::{
    load_zone_definitions, mapping_text, read_directory_text, DirectoryEntry, DirectoryParser,
    ZoneDefinition, ZoneDefinitions,
};
pub use icao_file::{load_icao_timezone_file, parse_icao_timezone_text};
pub use source::{
    select_row_source, Dataset, FixtureNames, FixtureSource, HttpSettings, RowSource,
    SparqlSource, DEFAULT_USER_AGENT, LOCAL_FILE_MARKER,
};
pub use sparql::{QueryResults, Row};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}")]
    Transport {
        context: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid user agent: {0}")]
    InvalidUserAgent(#[from] reqwest::header::InvalidHeaderValue),
    #[error("query endpoint returned http {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("malformed query result: {0}")]
    Json(#[from] serde_json::Error),
    #[error("query result row {row} lacks field `{field}`")]
    MissingField { row: usize, field: String },
    #[error("malformed zone definitions: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to extract text from {path}: {message}")]
    PdfExtraction { path: PathBuf, message: String },
    #[error("{path} is a PDF; rebuild with the `pdf` feature or pass a text dump")]
    PdfSupportDisabled { path: PathBuf },
    #[error("invalid pattern for {name}: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Binding names produced by the timezone query.
pub mod timezone_vars {
    pub const TIMEZONE: &str = "timezone";
    pub const ZONE_NAME: &str = "zoneName";
}

/// Binding names produced by the airport query.
pub mod airport_vars {
    pub const AIRPORT: &str = "airport";
    pub const ICAO_CODE: &str = "icaoCode";
    pub const AIRPORT_LABEL: &str = "airportLabel";
    pub const TIMEZONE: &str = "timezone";
    pub const ZONE_NAME: &str = "zoneName";
}

pub fn timezone_table_from_results(
    results: &QueryResults,
    entity_prefix: &str,
) -> Result<TimezoneTable, IngestError> {
    let mut table = TimezoneTable::new();
    for (index, row) in results.rows().iter().enumerate() {
        let raw_entity = row.required(index, timezone_vars::TIMEZONE)?;
        let entity = strip_entity_prefix(raw_entity, entity_prefix);
        let zone_name = row.required(index, timezone_vars::ZONE_NAME)?;
        if let Some(previous) = table.insert(zone_name, entity) {
            tracing::debug!(
                zone_name,
                previous = %previous,
                entity,
                "duplicate zone name; keeping last"
            );
        }
    }
    Ok(table)
}

pub fn airport_table_from_results(
    results: &QueryResults,
    entity_prefix: &str,
) -> Result<AirportTable, IngestError> {
    let mut table = AirportTable::new();
    for (index, row) in results.rows().iter().enumerate() {
        let icao = row.required(index, airport_vars::ICAO_CODE)?;
        if table.get(icao).is_some() {
            // The query joins against optional timezone claims and can repeat airports.
            continue;
        }
        let raw_entity = row.required(index, airport_vars::AIRPORT)?;
        let entity = strip_entity_prefix(raw_entity, entity_prefix);
        let name = row.required(index, airport_vars::AIRPORT_LABEL)?;
        let timezone_entity = row
            .optional(airport_vars::TIMEZONE)
            .map(|raw| strip_entity_prefix(raw, entity_prefix).to_string());
        let timezone_name = row.optional(airport_vars::ZONE_NAME).map(str::to_string);

        table.insert(Airport {
            entity: entity.to_string(),
            icao: icao.to_string(),
            name: name.to_string(),
            timezone_entity,
            timezone_name,
        });
    }
    Ok(table)
}

pub fn load_timezone_table(
    source: &dyn RowSource,
    query: &str,
    entity_prefix: &str,
) -> Result<TimezoneTable, IngestError> {
    let results = source.fetch(Dataset::IanaTimezones, query)?;
    let table = timezone_table_from_results(&results, entity_prefix)?;
    tracing::info!(source = %source.describe(), zones = table.len(), "loaded timezone items");
    Ok(table)
}

pub fn load_airport_table(
    source: &dyn RowSource,
    query: &str,
    entity_prefix: &str,
) -> Result<AirportTable, IngestError> {
    let results = source.fetch(Dataset::AirportIcao, query)?;
    let table = airport_table_from_results(&results, entity_prefix)?;
    tracing::info!(source = %source.describe(), airports = table.len(), "loaded airport items");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "http://www.wikidata.org/entity/";

    #[test]
    fn timezone_rows_strip_prefix_and_last_wins() {
        let results = QueryResults::from_json_str(
            r#"{"results":{"bindings":[
                {"timezone":{"value":"http://www.wikidata.org/entity/Q2"},"zoneName":{"value":"Europe/Vienna"}},
                {"timezone":{"value":"http://www.wikidata.org/entity/Q3"},"zoneName":{"value":"Europe/Vienna"}},
                {"timezone":{"value":"http://www.wikidata.org/entity/Q4"},"zoneName":{"value":"Europe/Berlin"}}
            ]}}"#,
        )
        .expect("decode");
        let table = timezone_table_from_results(&results, PREFIX).expect("table");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("Europe/Vienna"), Some("Q3"));
        assert_eq!(table.get("Europe/Berlin"), Some("Q4"));
    }

    #[test]
    fn airport_rows_first_wins_and_optional_fields_absent() {
        let results = QueryResults::from_json_str(
            r#"{"results":{"bindings":[
                {"airport":{"value":"http://www.wikidata.org/entity/Q1"},"icaoCode":{"value":"LOWW"},"airportLabel":{"value":"Vienna"}},
                {"airport":{"value":"http://www.wikidata.org/entity/Q9"},"icaoCode":{"value":"LOWW"},"airportLabel":{"value":"Duplicate"},
                 "timezone":{"value":"http://www.wikidata.org/entity/Q2"},"zoneName":{"value":"Europe/Vienna"}},
                {"airport":{"value":"http://www.wikidata.org/entity/Q5"},"icaoCode":{"value":"EDDF"},"airportLabel":{"value":"Frankfurt"},
                 "timezone":{"value":"http://www.wikidata.org/entity/Q6"},"zoneName":{"value":"Europe/Berlin"}}
            ]}}"#,
        )
        .expect("decode");
        let table = airport_table_from_results(&results, PREFIX).expect("table");
        assert_eq!(table.len(), 2);

        let loww = table.get("LOWW").expect("LOWW");
        assert_eq!(loww.entity, "Q1");
        assert_eq!(loww.name, "Vienna");
        assert_eq!(loww.timezone_entity, None);
        assert_eq!(loww.timezone_name, None);

        let eddf = table.get("EDDF").expect("EDDF");
        assert_eq!(eddf.timezone_entity.as_deref(), Some("Q6"));
        assert_eq!(eddf.timezone_name.as_deref(), Some("Europe/Berlin"));
    }

    #[test]
    fn airport_row_without_label_is_malformed() {
        let results = QueryResults::from_json_str(
            r#"{"results":{"bindings":[
                {"airport":{"value":"http://www.wikidata.org/entity/Q1"},"icaoCode":{"value":"LOWW"}}
            ]}}"#,
        )
        .expect("decode");
        let err = airport_table_from_results(&results, PREFIX).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingField { row: 0, ref field } if field == "airportLabel"
        ));
    }

    #[test]
    fn timezone_row_without_zone_name_is_malformed() {
        let results = QueryResults::from_json_str(
            r#"{"results":{"bindings":[{"timezone":{"value":"Q2"}}]}}"#,
        )
        .expect("decode");
        assert!(timezone_table_from_results(&results, PREFIX).is_err());
    }
}
