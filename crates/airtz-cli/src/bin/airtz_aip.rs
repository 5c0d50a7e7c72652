//! airtz-aip
//!
//! Produces the `ICAO IANA-NAME` mapping file consumed by `airtz` from the
//! airport directory section of AIP publications. Reads text dumps of the
//! publications (or the PDFs themselves when built with the `pdf` feature) and
//! prints one `ICAO IANA` (or `ICAO ?`) line per aerodrome to stdout.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::io::Write;
use std::path::PathBuf;

use airtz_ingest::{load_zone_definitions, mapping_text, read_directory_text, DirectoryParser};

#[path = "../logging.rs"]
mod logging;

#[derive(Parser, Debug)]
#[command(name = "airtz-aip")]
#[command(
    author,
    version,
    about = "Derives an ICAO to IANA timezone mapping from AIP airport directory text."
)]
struct Cli {
    /// TOML file of zone definitions (`iana`, `utc_standard`, `utc_daylight`, `icao_match`).
    #[arg(short, long, default_value = "time_zones.toml")]
    time_zones: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// AIP publications (`.pdf`) or text dumps of them, processed in order.
    #[arg(value_name = "PUBLICATION", required = true)]
    publications: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let zones = load_zone_definitions(&cli.time_zones)
        .with_context(|| format!("failed to load zone definitions: {}", cli.time_zones.display()))?;
    let parser = DirectoryParser::new()?;

    let mut stdout = std::io::stdout().lock();
    for path in &cli.publications {
        let text = read_directory_text(path)
            .with_context(|| format!("failed to read publication: {}", path.display()))?;
        let mapping = mapping_text(&parser, &zones, &text);
        tracing::info!(
            path = %path.display(),
            airports = mapping.lines().count(),
            "extracted airport directory"
        );
        stdout.write_all(mapping.as_bytes())?;
    }
    Ok(())
}
