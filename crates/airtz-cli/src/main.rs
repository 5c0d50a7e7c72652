//! airtz CLI
//!
//! Loads airport IANA timezone information into a Wikibase installation like
//! Wikidata:
//! - reads airport and timezone items through SPARQL (or local fixtures),
//! - joins them with a local `ICAO IANA-NAME` mapping file,
//! - writes the missing "located in time zone" claims through the action API.

use airtz_ingest::DEFAULT_USER_AGENT;
use anyhow::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

mod config;
mod logging;
mod run;

#[derive(Parser, Debug)]
#[command(name = "airtz")]
#[command(
    author,
    version,
    about = "Loads airport IANA timezone information into a Wikibase installation like Wikidata."
)]
pub struct Cli {
    /// Wikibase API endpoint to contact.
    #[arg(long, default_value = "https://www.wikidata.org/w/api.php")]
    pub api_endpoint: String,

    /// Entity ID prefix to remove from query results.
    #[arg(long, default_value = "http://www.wikidata.org/entity/")]
    pub entity_prefix: String,

    /// Wikibase SPARQL endpoint to contact.
    ///
    /// `file://<dir>` reads `wikidata_iana_timezone.json` and
    /// `wikidata_airport_icao.json` from `<dir>` instead.
    #[arg(long, default_value = "https://query.wikidata.org/sparql")]
    pub sparql_endpoint: String,

    /// File containing the query that lists IANA timezone items.
    #[arg(long, default_value = "wikidata_iana_timezone.sparql")]
    pub iana_timezone_query: PathBuf,

    /// File containing the query that lists airport items.
    #[arg(long, default_value = "wikidata_airport_icao.sparql")]
    pub airport_icao_query: PathBuf,

    /// JSON file with the OAuth `access_token` used for writes.
    #[arg(long, default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Only process the airport with this ICAO code.
    #[arg(long, value_name = "ICAO")]
    pub icao: Option<String>,

    /// Process every airport (explicit opt-in).
    #[arg(long)]
    pub all_airports: bool,

    /// Property used for the claim ("located in time zone").
    #[arg(long, default_value = airtz_wikibase::PROPERTY_LOCATED_IN_TIME_ZONE)]
    pub property: String,

    /// HTTP User-Agent for both the query service and the write API.
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Print the claims that would be written; do not contact the write API.
    #[arg(long)]
    pub dry_run: bool,

    /// Write the per-airport reconciliation report (JSON) to this file.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// File containing mappings of ICAO airport codes to IANA timezones.
    #[arg(value_name = "ICAO_TO_TIMEZONE")]
    pub icao_to_timezone: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = config::RunConfig::from_cli(cli)?;
    run::run(&config)
}
