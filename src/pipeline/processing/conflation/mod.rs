//! Station reconciliation: decides which raw records describe the same
//! physical site and merges them.
//!
//! The pipeline is an ordered list of [`MatchPass`]es. Each pass runs a
//! first-match-wins worklist over the stations admitted by its filters; a
//! merged station goes back on the worklist so chains of pairwise matches
//! collapse into one record. Scan order is the live-set order, which makes
//! output depend on input order. Inputs are therefore loaded in a stable order.

pub mod distance;
pub mod merge;
pub mod passes;

use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info};

use crate::domain::Station;
use crate::error::{ReconcileError, Result};
use crate::observability::metrics;

pub use distance::{station_distance, within_miles};
pub use merge::{
    combine_charging_points, combine_charging_port_groups, merge_charging_point, merge_charging_port_group,
    merge_station, NetworkConflictPolicy,
};
pub use passes::{standard_passes, MatchPass, MergeStrategy, PassOptions};

/// Outcome of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub name: String,
    pub input: usize,
    pub candidates: usize,
    pub passthrough: usize,
    pub merges: usize,
    pub output: usize,
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub stations: Vec<Station>,
    pub passes: Vec<PassReport>,
}

impl Reconciliation {
    pub fn total_merges(&self) -> usize {
        self.passes.iter().map(|pass| pass.merges).sum()
    }
}

/// Runs the pass list over a batch of stations.
pub struct Reconciler {
    passes: Vec<MatchPass>,
    policy: NetworkConflictPolicy,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(&PassOptions::default(), NetworkConflictPolicy::default())
    }
}

impl Reconciler {
    pub fn new(options: &PassOptions, policy: NetworkConflictPolicy) -> Self {
        Self {
            passes: standard_passes(options),
            policy,
        }
    }

    /// Use an explicit pass list instead of the standard one.
    pub fn with_passes(passes: Vec<MatchPass>, policy: NetworkConflictPolicy) -> Self {
        Self { passes, policy }
    }

    pub fn passes(&self) -> &[MatchPass] {
        &self.passes
    }

    pub fn policy(&self) -> NetworkConflictPolicy {
        self.policy
    }

    /// Check preconditions, then apply every pass in order.
    pub fn reconcile(&self, stations: Vec<Station>) -> Result<Reconciliation> {
        check_preconditions(&stations)?;

        let input = stations.len();
        metrics::reconcile::stations_in(input);

        let mut stations = stations;
        let mut reports = Vec::with_capacity(self.passes.len());
        for pass in &self.passes {
            let (next, report) = reconcile_pass(stations, pass, self.policy)?;
            info!(
                pass = %report.name,
                candidates = report.candidates,
                passthrough = report.passthrough,
                merges = report.merges,
                output = report.output,
                "Pass complete"
            );
            metrics::reconcile::pass_completed(&report.name, report.candidates, report.merges);
            stations = next;
            reports.push(report);
        }

        metrics::reconcile::stations_out(stations.len());
        info!(input, output = stations.len(), "Reconciliation complete");

        Ok(Reconciliation {
            stations,
            passes: reports,
        })
    }
}

/// Every station entering the pipeline must have a location and something
/// to be recognised by. Anything else is an adapter bug.
pub fn check_preconditions(stations: &[Station]) -> Result<()> {
    for (index, station) in stations.iter().enumerate() {
        if station.location.is_empty() {
            return Err(ReconcileError::MissingLocation(format!(
                "input position {}: {}",
                index,
                station.label()
            )));
        }
        if !station.has_identifying_attribute() {
            return Err(ReconcileError::Unidentifiable(format!("input position {}", index)));
        }
    }
    Ok(())
}

/// Apply one pass.
///
/// Stations rejected by a filter are emitted first, untouched. Candidates
/// are processed from a FIFO worklist: the popped station is compared with
/// the remaining live stations in order and merged with the first match;
/// the merged station joins the end of the live set and of the worklist.
/// A station with no match is final.
pub fn reconcile_pass(
    stations: Vec<Station>,
    pass: &MatchPass,
    policy: NetworkConflictPolicy,
) -> Result<(Vec<Station>, PassReport)> {
    let input = stations.len();
    let (candidates, passthrough): (Vec<Station>, Vec<Station>) =
        stations.into_iter().partition(|station| pass.accepts(station));

    let candidate_count = candidates.len();
    let passthrough_count = passthrough.len();

    // Slots own the stations; `live` holds slot indices in scan order.
    let mut slots: Vec<Option<Station>> = candidates.into_iter().map(Some).collect();
    let mut live: Vec<usize> = (0..slots.len()).collect();
    let mut worklist: VecDeque<usize> = live.iter().copied().collect();

    let mut result = passthrough;
    let mut merges = 0usize;

    while let Some(current) = worklist.pop_front() {
        let Some(position) = live.iter().position(|slot| *slot == current) else {
            continue;
        };
        live.remove(position);

        let Some(first) = slots[current].take() else {
            continue;
        };

        let matched = live.iter().position(|slot| {
            slots[*slot]
                .as_ref()
                .map_or(false, |second| pass.matches(&first, second))
        });

        match matched {
            Some(matched_position) => {
                let partner = live.remove(matched_position);
                let Some(second) = slots[partner].take() else {
                    continue;
                };
                debug!(
                    pass = pass.name,
                    first = %first.label(),
                    second = %second.label(),
                    "Merging stations"
                );

                let merged = merge_pair(first, second, pass.strategy, policy)?;
                slots.push(Some(merged));
                let merged_slot = slots.len() - 1;
                live.push(merged_slot);
                worklist.push_back(merged_slot);
                merges += 1;
            }
            None => result.push(first),
        }
    }

    let report = PassReport {
        name: pass.name.to_string(),
        input,
        candidates: candidate_count,
        passthrough: passthrough_count,
        merges,
        output: result.len(),
    };

    Ok((result, report))
}

fn merge_pair(
    mut first: Station,
    mut second: Station,
    strategy: MergeStrategy,
    policy: NetworkConflictPolicy,
) -> Result<Station> {
    if strategy == MergeStrategy::AdoptKnownNetwork {
        let adopted = if first.has_known_network() {
            first.network
        } else {
            second.network
        };
        first.network = adopted;
        second.network = adopted;
    }
    merge_station(first, second, policy)
}
