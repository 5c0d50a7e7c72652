//! ICAO → IANA mapping file.
//!
//! One record per line: `<ICAO> <IANA-NAME>`, or `<ICAO> ?` when the zone is
//! not known. Lines that do not split into exactly two fields are ignored.

use std::fs;
use std::path::Path;

use airtz_model::IcaoTimezoneTable;

use crate::IngestError;

pub const UNKNOWN_MARKER: &str = "?";

pub fn parse_icao_timezone_text(text: &str) -> IcaoTimezoneTable {
    let mut table = IcaoTimezoneTable::new();
    let mut skipped = 0usize;

    for (index, raw_line) in text.split('\n').enumerate() {
        let line = raw_line.trim_end_matches(['\r', '\n']);
        let mut fields = line.split_ascii_whitespace();
        let (Some(icao), Some(zone_name), None) = (fields.next(), fields.next(), fields.next())
        else {
            if !line.trim().is_empty() {
                skipped += 1;
                tracing::debug!(line = index + 1, "skipping malformed mapping line");
            }
            continue;
        };
        if zone_name == UNKNOWN_MARKER {
            continue;
        }
        if !table.insert(icao, zone_name) {
            tracing::debug!(line = index + 1, icao, "duplicate ICAO code; keeping first mapping");
        }
    }

    if skipped > 0 {
        tracing::info!(skipped, "ignored malformed lines in ICAO mapping");
    }
    table
}

pub fn load_icao_timezone_file(path: &Path) -> Result<IcaoTimezoneTable, IngestError> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_icao_timezone_text(&text);
    tracing::info!(path = %path.display(), entries = table.len(), "loaded ICAO mapping");
    Ok(table)
}
