//! Integration tests for the complete airtz pipeline
//!
//! These tests run the library crates end to end:
//! - fixture documents → loaders → tables
//! - tables → reconciler → pending facts
//! - pending facts → writer (scripted transport) → claims
//!
//! Run with: cargo test --test integration_tests

use std::cell::RefCell;
use std::fs;

use airtz_ingest::{
    load_airport_table, load_timezone_table, parse_icao_timezone_text, select_row_source,
    FixtureNames, HttpSettings,
};
use airtz_model::{Airport, AirportTable, PendingFact, Selection, TimezoneTable};
use airtz_reconcile::reconcile;
use airtz_wikibase::{
    ApiParams, ApiResponse, ApiTransport, ClaimConfig, Credentials, FactWriter, WikibaseError,
};

const PREFIX: &str = "http://www.wikidata.org/entity/";

fn vienna_airports(timezone_entity: Option<&str>) -> AirportTable {
    [Airport {
        entity: "Q1".to_string(),
        icao: "LOWW".to_string(),
        name: "Vienna".to_string(),
        timezone_entity: timezone_entity.map(str::to_string),
        timezone_name: None,
    }]
    .into_iter()
    .collect()
}

fn vienna_zones() -> TimezoneTable {
    [("Europe/Vienna", "Q2")].into_iter().collect()
}

// ============================================================================
// Reconciliation scenarios
// ============================================================================

#[test]
fn test_known_zone_produces_one_fact() {
    let mapping = parse_icao_timezone_text("LOWW Europe/Vienna\n");
    let facts = reconcile(&vienna_airports(None), &vienna_zones(), &mapping, &Selection::All)
        .expect("reconcile");
    assert_eq!(
        facts,
        vec![PendingFact {
            airport_entity: "Q1".to_string(),
            timezone_numeric_id: 2,
        }]
    );
}

#[test]
fn test_unknown_marker_produces_nothing() {
    let mapping = parse_icao_timezone_text("LOWW ?\n");
    let facts = reconcile(&vienna_airports(None), &vienna_zones(), &mapping, &Selection::All)
        .expect("reconcile");
    assert!(facts.is_empty());
}

#[test]
fn test_existing_claim_produces_nothing() {
    let mapping = parse_icao_timezone_text("LOWW Europe/Vienna\n");
    let facts = reconcile(
        &vienna_airports(Some("Q2")),
        &vienna_zones(),
        &mapping,
        &Selection::All,
    )
    .expect("reconcile");
    assert!(facts.is_empty());
}

#[test]
fn test_selection_flags_must_be_exclusive() {
    assert!(Selection::from_flags(Some("LOWW"), true).is_err());
    assert!(Selection::from_flags(None, false).is_err());
}

// ============================================================================
// Fixtures → reconcile → write
// ============================================================================

struct ScriptedTransport {
    calls: RefCell<Vec<(&'static str, ApiParams)>>,
}

impl ApiTransport for ScriptedTransport {
    fn get(&self, params: &ApiParams, _bearer: &str) -> Result<ApiResponse, WikibaseError> {
        self.calls.borrow_mut().push(("GET", params.clone()));
        Ok(ApiResponse {
            status: 200,
            body: r#"{"query":{"tokens":{"csrftoken":"t+\\"}}}"#.to_string(),
        })
    }

    fn post_form(&self, params: &ApiParams, _bearer: &str) -> Result<ApiResponse, WikibaseError> {
        self.calls.borrow_mut().push(("POST", params.clone()));
        Ok(ApiResponse {
            status: 200,
            body: r#"{"success":1}"#.to_string(),
        })
    }
}

#[test]
fn test_fixture_pipeline_writes_missing_claims_in_icao_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("wikidata_iana_timezone.json"),
        r#"{"results":{"bindings":[
            {"timezone":{"value":"http://www.wikidata.org/entity/Q2"},"zoneName":{"value":"Europe/Vienna"}},
            {"timezone":{"value":"http://www.wikidata.org/entity/Q9"},"zoneName":{"value":"America/New_York"}}
        ]}}"#,
    )
    .expect("write tz");
    fs::write(
        dir.path().join("wikidata_airport_icao.json"),
        r#"{"results":{"bindings":[
            {"airport":{"value":"http://www.wikidata.org/entity/Q1"},"icaoCode":{"value":"LOWW"},"airportLabel":{"value":"Vienna"}},
            {"airport":{"value":"http://www.wikidata.org/entity/Q8"},"icaoCode":{"value":"KJFK"},"airportLabel":{"value":"JFK"}},
            {"airport":{"value":"http://www.wikidata.org/entity/Q8"},"icaoCode":{"value":"KJFK"},"airportLabel":{"value":"JFK (dup)"}}
        ]}}"#,
    )
    .expect("write airports");

    let endpoint = format!("file://{}", dir.path().display());
    let source = select_row_source(&endpoint, &HttpSettings::default(), FixtureNames::default())
        .expect("source");
    let timezones = load_timezone_table(source.as_ref(), "", PREFIX).expect("timezones");
    let mut airports = load_airport_table(source.as_ref(), "", PREFIX).expect("airports");
    let mapping = parse_icao_timezone_text("LOWW Europe/Vienna\nKJFK America/New_York\n");

    let facts = reconcile(&airports, &timezones, &mapping, &Selection::All).expect("reconcile");
    let entities: Vec<&str> = facts.iter().map(|f| f.airport_entity.as_str()).collect();
    assert_eq!(entities, vec!["Q8", "Q1"]);

    let transport = ScriptedTransport {
        calls: RefCell::new(Vec::new()),
    };
    let credentials = Credentials::from_json_str(r#"{"access_token":"x"}"#).expect("credentials");
    let writer = FactWriter::new(&transport, credentials, ClaimConfig::default());
    for fact in &facts {
        let outcome = writer.submit_fact(fact).expect("submit");
        assert_eq!(outcome.status, 200);
    }

    let calls = transport.calls.borrow();
    let methods: Vec<&str> = calls.iter().map(|(m, _)| *m).collect();
    assert_eq!(methods, vec!["GET", "POST", "GET", "POST"]);
    let first_value = calls[1]
        .1
        .iter()
        .find(|(k, _)| *k == "value")
        .map(|(_, v)| v.clone())
        .expect("value param");
    let value: serde_json::Value = serde_json::from_str(&first_value).expect("value json");
    assert_eq!(value, serde_json::json!({"entity-type": "item", "numeric-id": 9}));

    // Written claims show up as existing timezones on the next run.
    for icao in ["KJFK", "LOWW"] {
        airports.get_mut(icao).expect("airport").timezone_entity = Some("recorded".to_string());
    }
    let again = reconcile(&airports, &timezones, &mapping, &Selection::All).expect("reconcile");
    assert!(again.is_empty());
}
