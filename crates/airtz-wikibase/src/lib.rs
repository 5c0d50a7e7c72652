//! Wikibase claim writer.
//!
//! Every fact is written with two calls against the MediaWiki action API:
//!
//! 1. `action=query&meta=tokens&type=csrf` → a short-lived CSRF token,
//! 2. `action=wbcreateclaim` with that token → the new statement.
//!
//! Both calls carry the OAuth bearer token. Writes are sequential and never
//! retried; the API's answer to step 2 is returned verbatim as a
//! [`WriteOutcome`].

pub mod credentials;
pub mod transport;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use airtz_model::{parse_entity_id, EntityId, ModelError, PendingFact};

pub use credentials::{load_credentials, Credentials};
pub use transport::{ApiParams, ApiResponse, ApiTransport, HttpTransport};

/// Wikidata's "located in time zone" property.
pub const PROPERTY_LOCATED_IN_TIME_ZONE: &str = "P421";

#[derive(Debug, thiserror::Error)]
pub enum WikibaseError {
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
    #[error("write api returned http {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token response carries no csrf token: {0}")]
    MissingToken(String),
    #[error("credentials file has an empty access_token")]
    MissingAccessToken,
    #[error("invalid user agent header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error(transparent)]
    InvalidEntityId(#[from] ModelError),
}

/// What gets written, independent of which facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimConfig {
    pub property: String,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            property: PROPERTY_LOCATED_IN_TIME_ZONE.to_string(),
        }
    }
}

/// Status and body of a `wbcreateclaim` call, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub status: u16,
    pub body: String,
}

#[derive(Serialize)]
struct ItemValue {
    #[serde(rename = "entity-type")]
    entity_type: &'static str,
    #[serde(rename = "numeric-id")]
    numeric_id: u64,
}

/// JSON `value` parameter for an item-valued snak.
pub fn item_value_json(numeric_id: u64) -> Result<String, WikibaseError> {
    Ok(serde_json::to_string(&ItemValue {
        entity_type: "item",
        numeric_id,
    })?)
}

pub fn csrf_token_params() -> ApiParams {
    vec![
        ("action", "query".to_string()),
        ("meta", "tokens".to_string()),
        ("type", "csrf".to_string()),
        ("format", "json".to_string()),
    ]
}

pub fn create_claim_params(
    fact: &PendingFact,
    config: &ClaimConfig,
    token: &str,
) -> Result<ApiParams, WikibaseError> {
    // The airport must be an item id as well; it becomes the `entity` parameter.
    parse_entity_id(&fact.airport_entity)?;

    Ok(vec![
        ("action", "wbcreateclaim".to_string()),
        ("entity", fact.airport_entity.clone()),
        ("property", config.property.clone()),
        ("snaktype", "value".to_string()),
        ("value", item_value_json(fact.timezone_numeric_id)?),
        ("token", token.to_string()),
        ("format", "json".to_string()),
    ])
}

#[derive(Deserialize)]
struct TokenResponse {
    query: Option<TokenQuery>,
}

#[derive(Deserialize)]
struct TokenQuery {
    tokens: Option<TokenSet>,
}

#[derive(Deserialize)]
struct TokenSet {
    csrftoken: Option<String>,
}

pub fn parse_csrf_token(body: &str) -> Result<String, WikibaseError> {
    let resp: TokenResponse = serde_json::from_str(body)?;
    resp.query
        .and_then(|q| q.tokens)
        .and_then(|t| t.csrftoken)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            let preview: String = body.chars().take(200).collect();
            WikibaseError::MissingToken(preview)
        })
}

pub struct FactWriter<T: ApiTransport> {
    transport: T,
    credentials: Credentials,
    config: ClaimConfig,
}

impl<T: ApiTransport> FactWriter<T> {
    pub fn new(transport: T, credentials: Credentials, config: ClaimConfig) -> Self {
        Self {
            transport,
            credentials,
            config,
        }
    }

    pub fn fetch_csrf_token(&self) -> Result<String, WikibaseError> {
        let resp = self
            .transport
            .get(&csrf_token_params(), &self.credentials.access_token)?;
        if !resp.is_success() {
            return Err(WikibaseError::HttpStatus {
                status: resp.status,
                body: resp.body,
            });
        }
        parse_csrf_token(&resp.body)
    }

    /// Write one fact: fetch a fresh token, then create the claim.
    pub fn submit_fact(&self, fact: &PendingFact) -> Result<WriteOutcome, WikibaseError> {
        let token = self.fetch_csrf_token()?;
        let params = create_claim_params(fact, &self.config, &token)?;

        tracing::info!(
            entity = %fact.airport_entity,
            property = %self.config.property,
            timezone = %EntityId(fact.timezone_numeric_id),
            "creating claim"
        );
        let resp = self
            .transport
            .post_form(&params, &self.credentials.access_token)?;
        if !resp.is_success() {
            return Err(WikibaseError::HttpStatus {
                status: resp.status,
                body: resp.body,
            });
        }
        Ok(WriteOutcome {
            status: resp.status,
            body: resp.body,
        })
    }
}
