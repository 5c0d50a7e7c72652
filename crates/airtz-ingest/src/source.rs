//! Where query rows come from.
//!
//! A [`RowSource`] answers "give me the rows for this dataset". Two
//! implementations exist:
//! - [`SparqlSource`] posts the query text to a live SPARQL endpoint,
//! - [`FixtureSource`] reads a pre-fetched result document from a directory.
//!
//! The choice is made once from the endpoint string ([`select_row_source`]).

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sparql::QueryResults;
use crate::IngestError;

/// Endpoint prefix that switches to fixture mode; the rest is a directory.
pub const LOCAL_FILE_MARKER: &str = "file://";

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// User agent sent to the query service and the write API unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "airtz/",
    env!("CARGO_PKG_VERSION"),
    " (airport timezone loader; +https://github.com/airtz/airtz)"
);

/// The two logical datasets the loaders ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    IanaTimezones,
    AirportIcao,
}

impl Dataset {
    pub fn label(self) -> &'static str {
        match self {
            Dataset::IanaTimezones => "iana timezones",
            Dataset::AirportIcao => "airport icao codes",
        }
    }
}

pub trait RowSource {
    /// Fetch the result document for `dataset`. `query` may be ignored.
    fn fetch(&self, dataset: Dataset, query: &str) -> Result<QueryResults, IngestError>;

    /// Short description for logs.
    fn describe(&self) -> String;

    /// Whether `fetch` looks at the query text at all.
    fn uses_query(&self) -> bool {
        true
    }
}

// ============================================================================
// Live endpoint
// ============================================================================

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct SparqlSource {
    client: Client,
    endpoint: String,
}

impl SparqlSource {
    pub fn new(endpoint: &str, settings: &HttpSettings) -> Result<Self, IngestError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&settings.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static(SPARQL_RESULTS_JSON));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|source| IngestError::Transport {
                context: "failed to build http client".to_string(),
                source,
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl RowSource for SparqlSource {
    fn fetch(&self, dataset: Dataset, query: &str) -> Result<QueryResults, IngestError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            dataset = dataset.label(),
            "posting sparql query"
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .form(&[("query", query), ("format", "json")])
            .send()
            .map_err(|source| IngestError::Transport {
                context: format!("failed to reach {}", self.endpoint),
                source,
            })?;

        let status = resp.status();
        let body = resp.text().map_err(|source| IngestError::Transport {
            context: format!("failed to read response from {}", self.endpoint),
            source,
        })?;
        if !status.is_success() {
            return Err(IngestError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        QueryResults::from_json_str(&body)
    }

    fn describe(&self) -> String {
        format!("sparql({})", self.endpoint)
    }
}

// ============================================================================
// Local fixtures
// ============================================================================

/// File names read in fixture mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureNames {
    pub iana_timezones: String,
    pub airport_icao: String,
}

impl Default for FixtureNames {
    fn default() -> Self {
        Self {
            iana_timezones: "wikidata_iana_timezone.json".to_string(),
            airport_icao: "wikidata_airport_icao.json".to_string(),
        }
    }
}

impl FixtureNames {
    pub fn file_name(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::IanaTimezones => &self.iana_timezones,
            Dataset::AirportIcao => &self.airport_icao,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FixtureSource {
    dir: PathBuf,
    names: FixtureNames,
}

impl FixtureSource {
    pub fn new(dir: impl Into<PathBuf>, names: FixtureNames) -> Self {
        Self {
            dir: dir.into(),
            names,
        }
    }

    pub fn path_for(&self, dataset: Dataset) -> PathBuf {
        self.dir.join(self.names.file_name(dataset))
    }
}

impl RowSource for FixtureSource {
    fn fetch(&self, dataset: Dataset, _query: &str) -> Result<QueryResults, IngestError> {
        let path = self.path_for(dataset);
        tracing::debug!(path = %path.display(), dataset = dataset.label(), "reading fixture");
        let text = fs::read_to_string(&path).map_err(|source| IngestError::Io {
            path: path.clone(),
            source,
        })?;
        QueryResults::from_json_str(&text)
    }

    fn describe(&self) -> String {
        format!("fixture({})", self.dir.display())
    }

    fn uses_query(&self) -> bool {
        false
    }
}

/// Pick the row source for an endpoint string.
///
/// `file://<dir>` selects fixtures under `<dir>` (an empty remainder means the
/// current directory); anything else is treated as a SPARQL endpoint URL.
pub fn select_row_source(
    endpoint: &str,
    settings: &HttpSettings,
    names: FixtureNames,
) -> Result<Box<dyn RowSource>, IngestError> {
    match endpoint.strip_prefix(LOCAL_FILE_MARKER) {
        Some(dir) => {
            let dir = if dir.is_empty() { Path::new(".") } else { Path::new(dir) };
            Ok(Box::new(FixtureSource::new(dir, names)))
        }
        None => Ok(Box::new(SparqlSource::new(endpoint, settings)?)),
    }
}
