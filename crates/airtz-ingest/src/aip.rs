//! Mapping-file producer for AIP airport directories.
//!
//! Aeronautical information publications list every aerodrome in an
//! "AIRPORT/FACILITY DIRECTORY" section, one header per aerodrome of the form
//! `NAME (ICAO) ... UTC-5(-4DT)`. [`DirectoryParser`] picks the ICAO code and
//! the standard/daylight offsets out of such a text line; [`ZoneDefinitions`]
//! turns the offsets into an IANA zone name. The output lines (`ICAO IANA` or
//! `ICAO ?`) are exactly what [`crate::parse_icao_timezone_text`] reads.
//!
//! Input is the publication's text, one printed line per text line: either a
//! text dump (e.g. `pdftotext -layout`) or, with the `pdf` feature, the PDF
//! itself ([`read_directory_text`]). Header lines only occur in the directory
//! section, so the whole text is scanned.

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::icao_file::UNKNOWN_MARKER;
use crate::IngestError;

const EN_DASH: char = '\u{2013}';

// `dst_reversed` covers headers printed as `UTC-12(11-DT)`.
const DIRECTORY_LINE: &str = concat!(
    r"\((?P<icao>[A-Z0-9]{4})\)",
    r".+",
    r"UTC ?(?P<utc>[-+\x{2013}][0-9]+)",
    r"(?: ?\((?:(?P<dst>[-+\x{2013} ]?[0-9]+)|(?P<dst_reversed>[0-9]+[-+\x{2013}]))",
    r"(?:DT|D|T)?\))?",
);

/// One aerodrome header: where it is and which offsets it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub icao: String,
    pub utc_standard: i8,
    pub utc_daylight: Option<i8>,
}

pub struct DirectoryParser {
    pattern: Regex,
}

impl DirectoryParser {
    pub fn new() -> Result<Self, IngestError> {
        let pattern =
            Regex::new(DIRECTORY_LINE).map_err(|source| IngestError::InvalidPattern {
                name: "directory line".to_string(),
                source,
            })?;
        Ok(Self { pattern })
    }

    /// `None` for lines that are not an aerodrome header.
    pub fn parse_line(&self, line: &str) -> Option<DirectoryEntry> {
        let caps = self.pattern.captures(line)?;
        let icao = caps.name("icao")?.as_str().to_string();
        let utc_standard = normalize_offset(caps.name("utc")?.as_str())?;

        let utc_daylight = match (caps.name("dst"), caps.name("dst_reversed")) {
            (Some(dst), _) => {
                let daylight = normalize_offset(dst.as_str())?;
                // "UTC-5( 4DT)": the sign went missing in print.
                Some(if utc_standard < -2 && daylight > 2 {
                    -daylight
                } else {
                    daylight
                })
            }
            (None, Some(reversed)) => Some(normalize_reversed_offset(reversed.as_str())?),
            (None, None) => None,
        };

        Some(DirectoryEntry {
            icao,
            utc_standard,
            utc_daylight,
        })
    }

    /// Every aerodrome header in `text`, in reading order.
    pub fn entries(&self, text: &str) -> Vec<DirectoryEntry> {
        text.lines().filter_map(|line| self.parse_line(line)).collect()
    }
}

fn normalize_offset(raw: &str) -> Option<i8> {
    let dashed = raw.replace(EN_DASH, "-");
    let unsigned = dashed
        .strip_prefix('+')
        .or_else(|| dashed.strip_prefix(' '))
        .unwrap_or(&dashed);
    unsigned.parse().ok()
}

/// `"12-"` → `-12`.
fn normalize_reversed_offset(raw: &str) -> Option<i8> {
    let sign = raw.chars().last()?;
    let digits = &raw[..raw.len() - sign.len_utf8()];
    normalize_offset(&format!("{sign}{digits}"))
}

// ============================================================================
// Zone definitions
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawZoneDefinition {
    icao_match: Option<String>,
    iana: String,
    utc_standard: i8,
    utc_daylight: Option<i8>,
}

/// An IANA zone and the offsets that identify it, optionally restricted to
/// ICAO codes matching a pattern (e.g. `^K` for the contiguous US).
#[derive(Debug, Clone)]
pub struct ZoneDefinition {
    pub name: String,
    pub icao_match: Option<Regex>,
    pub iana: String,
    pub utc_standard: i8,
    pub utc_daylight: Option<i8>,
}

impl ZoneDefinition {
    pub fn matches(&self, entry: &DirectoryEntry) -> bool {
        if let Some(pattern) = &self.icao_match {
            if !pattern.is_match(&entry.icao) {
                return false;
            }
        }
        self.utc_standard == entry.utc_standard && self.utc_daylight == entry.utc_daylight
    }
}

/// Zone definitions keyed by table name; the first match in name order wins.
#[derive(Debug, Clone, Default)]
pub struct ZoneDefinitions {
    zones: Vec<ZoneDefinition>,
}

impl ZoneDefinitions {
    /// Parse a TOML document of `[name]` tables with `iana`, `utc_standard`,
    /// optional `utc_daylight` and optional `icao_match` (a regex).
    pub fn from_toml_str(text: &str) -> Result<Self, IngestError> {
        let raw: BTreeMap<String, RawZoneDefinition> = toml::from_str(text)?;
        let mut zones = Vec::with_capacity(raw.len());
        for (name, def) in raw {
            let icao_match = def
                .icao_match
                .as_deref()
                .map(Regex::new)
                .transpose()
                .map_err(|source| IngestError::InvalidPattern {
                    name: name.clone(),
                    source,
                })?;
            zones.push(ZoneDefinition {
                name,
                icao_match,
                iana: def.iana,
                utc_standard: def.utc_standard,
                utc_daylight: def.utc_daylight,
            });
        }
        Ok(Self { zones })
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn resolve(&self, entry: &DirectoryEntry) -> Option<&ZoneDefinition> {
        self.zones.iter().find(|zone| zone.matches(entry))
    }
}

pub fn load_zone_definitions(path: &Path) -> Result<ZoneDefinitions, IngestError> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let zones = ZoneDefinitions::from_toml_str(&text)?;
    tracing::info!(path = %path.display(), zones = zones.len(), "loaded zone definitions");
    Ok(zones)
}

// ============================================================================
// Publication text
// ============================================================================

/// Text of a PDF publication.
#[cfg(feature = "pdf")]
pub fn extract_pdf_text(path: &Path) -> Result<String, IngestError> {
    pdf_extract::extract_text(path).map_err(|e| IngestError::PdfExtraction {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(not(feature = "pdf"))]
pub fn extract_pdf_text(path: &Path) -> Result<String, IngestError> {
    Err(IngestError::PdfSupportDisabled {
        path: path.to_path_buf(),
    })
}

/// Publication text from a `.pdf` file or a plain text dump.
pub fn read_directory_text(path: &Path) -> Result<String, IngestError> {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        return extract_pdf_text(path);
    }
    fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Mapping-file text for every aerodrome header in `text`.
pub fn mapping_text(parser: &DirectoryParser, zones: &ZoneDefinitions, text: &str) -> String {
    let mut out = String::new();
    for entry in parser.entries(text) {
        let zone_name = match zones.resolve(&entry) {
            Some(zone) => zone.iana.as_str(),
            None => {
                tracing::debug!(
                    icao = %entry.icao,
                    utc_standard = entry.utc_standard,
                    utc_daylight = ?entry.utc_daylight,
                    "no zone definition matches"
                );
                UNKNOWN_MARKER
            }
        };
        let _ = writeln!(out, "{} {}", entry.icao, zone_name);
    }
    out
}
