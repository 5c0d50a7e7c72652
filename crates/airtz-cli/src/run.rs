//! The linear pipeline: load → reconcile → (dry run | write).

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use airtz_ingest::{
    load_airport_table, load_icao_timezone_file, load_timezone_table, select_row_source,
    RowSource,
};
use airtz_model::EntityId;
use airtz_reconcile::{reconcile_report, Reconciliation};
use airtz_wikibase::{load_credentials, FactWriter, HttpTransport};

use crate::config::RunConfig;

pub fn run(config: &RunConfig) -> Result<()> {
    let source = select_row_source(
        &config.sparql_endpoint,
        &config.http,
        config.fixture_names.clone(),
    )?;
    tracing::info!(source = %source.describe(), "selected row source");

    let timezone_query = read_query(source.as_ref(), &config.iana_timezone_query)?;
    let airport_query = read_query(source.as_ref(), &config.airport_icao_query)?;

    let timezones = load_timezone_table(source.as_ref(), &timezone_query, &config.entity_prefix)
        .context("failed to load IANA timezone items")?;
    let airports = load_airport_table(source.as_ref(), &airport_query, &config.entity_prefix)
        .context("failed to load airport items")?;
    let icao_timezones = load_icao_timezone_file(&config.icao_to_timezone)
        .context("failed to load ICAO timezone mapping")?;

    let report = reconcile_report(&airports, &timezones, &icao_timezones, &config.selection)?;
    if let Some(path) = &config.report {
        write_report(path, &report)?;
    }

    if config.dry_run {
        print_dry_run(&report);
        return Ok(());
    }
    submit_all(config, &report)
}

fn read_query(source: &dyn RowSource, path: &Path) -> Result<String> {
    if !source.uses_query() {
        tracing::debug!(path = %path.display(), "row source ignores queries; not reading");
        return Ok(String::new());
    }
    fs::read_to_string(path)
        .with_context(|| format!("failed to read query file: {}", path.display()))
}

fn write_report(path: &Path, report: &Reconciliation) -> Result<()> {
    let text = serde_json::to_string_pretty(report)?;
    fs::write(path, text).with_context(|| format!("failed to write report: {}", path.display()))?;
    println!("  {} {}", "→".cyan(), path.display());
    Ok(())
}

fn print_dry_run(report: &Reconciliation) {
    let mut count = 0usize;
    for (icao, zone_name, fact) in report.pending() {
        println!(
            "{} {} {} {} {}",
            "would write".yellow(),
            icao,
            fact.airport_entity,
            zone_name,
            EntityId(fact.timezone_numeric_id)
        );
        count += 1;
    }
    println!("{} pending={count}", "Dry run".green().bold());
}

fn submit_all(config: &RunConfig, report: &Reconciliation) -> Result<()> {
    let credentials = load_credentials(&config.credentials)
        .with_context(|| format!("failed to load credentials: {}", config.credentials.display()))?;
    let transport = HttpTransport::new(
        &config.api_endpoint,
        &config.http.user_agent,
        config.http.timeout,
    )?;
    let writer = FactWriter::new(transport, credentials, config.claim.clone());

    let mut attempted = 0usize;
    for (icao, zone_name, fact) in report.pending() {
        println!(
            "{} {} {} → {} ({})",
            "Writing".green().bold(),
            icao,
            fact.airport_entity,
            zone_name,
            EntityId(fact.timezone_numeric_id)
        );
        let outcome = writer.submit_fact(fact).with_context(|| {
            format!(
                "failed to write timezone claim for {icao} ({})",
                fact.airport_entity
            )
        })?;
        attempted += 1;
        println!("  {} status={} {}", "→".cyan(), outcome.status, outcome.body);
    }

    println!("{} submitted={attempted}", "Done".green().bold());
    Ok(())
}
