//! Reconciliation: which airports still need a "located in time zone" claim.
//!
//! The three tables are joined in a single pass over the airport table (ICAO
//! order). Each airport runs through a chain of vetoes:
//!
//! 1. not selected for this run,
//! 2. already has a timezone claim,
//! 3. no zone known for its ICAO code,
//! 4. zone name not known to the knowledge base.
//!
//! The first veto that fires ends processing of that airport. An airport that
//! passes all four becomes a [`PendingFact`] once its timezone entity id parses;
//! an unparseable id aborts the whole run.

use serde::Serialize;

use airtz_model::{
    parse_entity_id, Airport, AirportTable, IcaoTimezoneTable, ModelError, PendingFact, Selection,
    TimezoneTable,
};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("timezone {zone_name:?} (needed by {icao}) maps to an unusable entity: {source}")]
    InvalidTimezoneEntity {
        icao: String,
        zone_name: String,
        #[source]
        source: ModelError,
    },
}

/// Why an airport did or did not produce a fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    NotSelected,
    Pending {
        timezone_name: String,
        fact: PendingFact,
    },
    AlreadyHasTimezone {
        timezone_entity: String,
    },
    UnknownTimezone,
    UnresolvedTimezoneEntity {
        timezone_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirportDecision {
    pub icao: String,
    pub airport_entity: String,
    #[serde(flatten)]
    pub decision: Decision,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecisionCounts {
    pub pending: usize,
    pub not_selected: usize,
    pub already_has_timezone: usize,
    pub unknown_timezone: usize,
    pub unresolved_timezone_entity: usize,
}

/// Result of one reconciliation pass: one decision per airport, in ICAO order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub decisions: Vec<AirportDecision>,
    pub counts: DecisionCounts,
}

impl Reconciliation {
    /// Pending facts in ICAO order.
    pub fn facts(&self) -> Vec<PendingFact> {
        self.pending().map(|(_, _, fact)| fact.clone()).collect()
    }

    /// `(icao, timezone_name, fact)` for each pending airport, in ICAO order.
    pub fn pending(&self) -> impl Iterator<Item = (&str, &str, &PendingFact)> {
        self.decisions.iter().filter_map(|d| match &d.decision {
            Decision::Pending {
                timezone_name,
                fact,
            } => Some((d.icao.as_str(), timezone_name.as_str(), fact)),
            _ => None,
        })
    }
}

/// Facts-only view of [`reconcile_report`].
pub fn reconcile(
    airports: &AirportTable,
    timezones: &TimezoneTable,
    icao_timezones: &IcaoTimezoneTable,
    selection: &Selection,
) -> Result<Vec<PendingFact>, ReconcileError> {
    Ok(reconcile_report(airports, timezones, icao_timezones, selection)?.facts())
}

pub fn reconcile_report(
    airports: &AirportTable,
    timezones: &TimezoneTable,
    icao_timezones: &IcaoTimezoneTable,
    selection: &Selection,
) -> Result<Reconciliation, ReconcileError> {
    if let Selection::Single(code) = selection {
        if airports.get(code).is_none() {
            tracing::warn!(icao = %code, "selected airport is not in the knowledge base");
        }
    }

    let mut out = Reconciliation::default();
    for airport in airports.iter() {
        let decision = if selection.matches(&airport.icao) {
            decide(airport, timezones, icao_timezones)?
        } else {
            Decision::NotSelected
        };
        match &decision {
            Decision::NotSelected => out.counts.not_selected += 1,
            Decision::Pending { .. } => out.counts.pending += 1,
            Decision::AlreadyHasTimezone { .. } => out.counts.already_has_timezone += 1,
            Decision::UnknownTimezone => out.counts.unknown_timezone += 1,
            Decision::UnresolvedTimezoneEntity { timezone_name } => {
                tracing::warn!(
                    icao = %airport.icao,
                    zone_name = %timezone_name,
                    "IANA timezone unknown to the knowledge base; skipping airport"
                );
                out.counts.unresolved_timezone_entity += 1;
            }
        }
        tracing::debug!(icao = %airport.icao, ?decision, "reconciled airport");

        out.decisions.push(AirportDecision {
            icao: airport.icao.clone(),
            airport_entity: airport.entity.clone(),
            decision,
        });
    }

    tracing::info!(
        pending = out.counts.pending,
        not_selected = out.counts.not_selected,
        already_has_timezone = out.counts.already_has_timezone,
        unknown_timezone = out.counts.unknown_timezone,
        unresolved_timezone_entity = out.counts.unresolved_timezone_entity,
        "reconciliation finished"
    );
    Ok(out)
}

fn decide(
    airport: &Airport,
    timezones: &TimezoneTable,
    icao_timezones: &IcaoTimezoneTable,
) -> Result<Decision, ReconcileError> {
    if let Some(timezone_entity) = &airport.timezone_entity {
        return Ok(Decision::AlreadyHasTimezone {
            timezone_entity: timezone_entity.clone(),
        });
    }
    let Some(zone_name) = icao_timezones.get(&airport.icao) else {
        return Ok(Decision::UnknownTimezone);
    };
    let Some(zone_entity) = timezones.get(zone_name) else {
        return Ok(Decision::UnresolvedTimezoneEntity {
            timezone_name: zone_name.to_string(),
        });
    };

    let timezone_numeric_id =
        parse_entity_id(zone_entity).map_err(|source| ReconcileError::InvalidTimezoneEntity {
            icao: airport.icao.clone(),
            zone_name: zone_name.to_string(),
            source,
        })?;

    Ok(Decision::Pending {
        timezone_name: zone_name.to_string(),
        fact: PendingFact {
            airport_entity: airport.entity.clone(),
            timezone_numeric_id,
        },
    })
}
