//! Run configuration assembled from the command line.
//!
//! Everything here is validated before any file or network access.

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use airtz_ingest::{FixtureNames, HttpSettings, LOCAL_FILE_MARKER};
use airtz_model::Selection;
use airtz_wikibase::ClaimConfig;

use crate::Cli;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub selection: Selection,
    pub api_endpoint: String,
    pub sparql_endpoint: String,
    pub entity_prefix: String,
    pub iana_timezone_query: PathBuf,
    pub airport_icao_query: PathBuf,
    pub credentials: PathBuf,
    pub icao_to_timezone: PathBuf,
    pub claim: ClaimConfig,
    pub http: HttpSettings,
    pub fixture_names: FixtureNames,
    pub dry_run: bool,
    pub report: Option<PathBuf>,
}

impl RunConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let selection = Selection::from_flags(cli.icao.as_deref(), cli.all_airports)?;

        if cli.timeout_secs == 0 {
            return Err(anyhow!("--timeout-secs must be > 0"));
        }
        Url::parse(&cli.api_endpoint)
            .with_context(|| format!("invalid --api-endpoint: {}", cli.api_endpoint))?;
        if !cli.sparql_endpoint.starts_with(LOCAL_FILE_MARKER) {
            Url::parse(&cli.sparql_endpoint)
                .with_context(|| format!("invalid --sparql-endpoint: {}", cli.sparql_endpoint))?;
        }
        if cli.property.trim().is_empty() {
            return Err(anyhow!("--property must not be empty"));
        }

        Ok(Self {
            selection,
            api_endpoint: cli.api_endpoint,
            sparql_endpoint: cli.sparql_endpoint,
            entity_prefix: cli.entity_prefix,
            iana_timezone_query: cli.iana_timezone_query,
            airport_icao_query: cli.airport_icao_query,
            credentials: cli.credentials,
            icao_to_timezone: cli.icao_to_timezone,
            claim: ClaimConfig {
                property: cli.property,
            },
            http: HttpSettings {
                user_agent: cli.user_agent,
                timeout: Duration::from_secs(cli.timeout_secs),
            },
            fixture_names: FixtureNames::default(),
            dry_run: cli.dry_run,
            report: cli.report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config(args: &[&str]) -> Result<RunConfig> {
        let mut argv = vec!["airtz"];
        argv.extend_from_slice(args);
        RunConfig::from_cli(Cli::try_parse_from(argv)?)
    }

    #[test]
    fn defaults_target_wikidata() {
        let cfg = config(&["--all-airports", "map.txt"]).expect("config");
        assert_eq!(cfg.selection, Selection::All);
        assert_eq!(cfg.api_endpoint, "https://www.wikidata.org/w/api.php");
        assert_eq!(cfg.sparql_endpoint, "https://query.wikidata.org/sparql");
        assert_eq!(cfg.entity_prefix, "http://www.wikidata.org/entity/");
        assert_eq!(cfg.claim.property, "P421");
        assert_eq!(cfg.icao_to_timezone, PathBuf::from("map.txt"));
        assert_eq!(cfg.http.timeout, Duration::from_secs(30));
        assert!(cfg.http.user_agent.starts_with("airtz/"));
        assert!(!cfg.dry_run);
    }

    #[test]
    fn single_airport_selection() {
        let cfg = config(&["--icao", "LOWW", "map.txt"]).expect("config");
        assert_eq!(cfg.selection, Selection::Single("LOWW".to_string()));
    }

    #[test]
    fn selection_flags_are_exclusive() {
        let both = config(&["--icao", "LOWW", "--all-airports", "map.txt"]).unwrap_err();
        assert!(both.to_string().contains("not both"), "{both}");
        let neither = config(&["map.txt"]).unwrap_err();
        assert!(neither.to_string().contains("invalid airport selection"), "{neither}");
    }

    #[test]
    fn fixture_endpoint_is_not_parsed_as_url() {
        let cfg = config(&["--all-airports", "--sparql-endpoint", "file://fixtures/", "map.txt"])
            .expect("config");
        assert_eq!(cfg.sparql_endpoint, "file://fixtures/");
    }

    #[test]
    fn rejects_bad_endpoints_and_timeouts() {
        assert!(config(&["--all-airports", "--api-endpoint", "not a url", "m"]).is_err());
        assert!(config(&["--all-airports", "--sparql-endpoint", "::", "m"]).is_err());
        assert!(config(&["--all-airports", "--timeout-secs", "0", "m"]).is_err());
    }
}
