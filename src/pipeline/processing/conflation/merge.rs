use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::{debug, warn};

use crate::domain::{ChargingNetwork, ChargingPoint, ChargingPortGroup, SourcedAttribute, Station};
use crate::error::{ReconcileError, Result};
use crate::observability::metrics;

/// What to do when two stations judged equivalent report different networks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkConflictPolicy {
    /// The second station's network wins. Matches the published catalog.
    #[default]
    PreferSecond,
    /// The first station's network is kept.
    PreferFirst,
    /// Abort the run.
    Reject,
}

impl NetworkConflictPolicy {
    /// Resolve the merged station's network. Agreement or a single reported
    /// network is never a conflict.
    pub fn resolve(
        &self,
        first: Option<ChargingNetwork>,
        second: Option<ChargingNetwork>,
    ) -> Result<Option<ChargingNetwork>> {
        match (first, second) {
            (Some(first), Some(second)) if first != second => {
                metrics::reconcile::network_conflict();
                match self {
                    NetworkConflictPolicy::PreferSecond => Ok(Some(second)),
                    NetworkConflictPolicy::PreferFirst => Ok(Some(first)),
                    NetworkConflictPolicy::Reject => Err(ReconcileError::NetworkConflict { first, second }),
                }
            }
            (first, None) => Ok(first),
            (_, Some(second)) => Ok(Some(second)),
        }
    }
}

/// Merge two stations already judged to be the same physical site.
pub fn merge_station(first: Station, second: Station, policy: NetworkConflictPolicy) -> Result<Station> {
    if let (Some(a), Some(b)) = (first.network, second.network) {
        if a != b {
            warn!(
                first = %a,
                second = %b,
                policy = ?policy,
                station = %first.label(),
                "Conflicting networks when merging stations"
            );
        }
    }
    let network = policy.resolve(first.network, second.network)?;

    Ok(Station {
        name: SourcedAttribute::union(&first.name, &second.name),
        network,
        location: SourcedAttribute::union(&first.location, &second.location),
        street_address: SourcedAttribute::union(&first.street_address, &second.street_address),
        city: SourcedAttribute::union(&first.city, &second.city),
        state: SourcedAttribute::union(&first.state, &second.state),
        zip_code: SourcedAttribute::union(&first.zip_code, &second.zip_code),
        osm_id: SourcedAttribute::union(&first.osm_id, &second.osm_id),
        nrel_id: SourcedAttribute::union(&first.nrel_id, &second.nrel_id),
        ocm_id: SourcedAttribute::union(&first.ocm_id, &second.ocm_id),
        network_id: SourcedAttribute::union(&first.network_id, &second.network_id),
        charging_points: combine_charging_points(first.charging_points, second.charging_points),
    })
}

/// Merge two charging points already judged to be the same post.
pub fn merge_charging_point(first: ChargingPoint, second: ChargingPoint) -> ChargingPoint {
    let name = if second.name.is_empty() {
        first.name
    } else {
        second.name
    };

    ChargingPoint {
        name,
        location: SourcedAttribute::union(&first.location, &second.location),
        nrel_id: SourcedAttribute::union(&first.nrel_id, &second.nrel_id),
        ocm_id: SourcedAttribute::union(&first.ocm_id, &second.ocm_id),
        osm_id: SourcedAttribute::union(&first.osm_id, &second.osm_id),
        network_id: SourcedAttribute::union(&first.network_id, &second.network_id),
        charging_port_groups: combine_charging_port_groups(
            first.charging_port_groups,
            second.charging_port_groups,
        ),
    }
}

/// Merge two port groups already judged to be the same EVSE.
pub fn merge_charging_port_group(first: ChargingPortGroup, second: ChargingPortGroup) -> ChargingPortGroup {
    let network_id = first
        .key()
        .or_else(|| second.key())
        .map(str::to_string);

    let mut charging_ports = Vec::with_capacity(first.charging_ports.len() + second.charging_ports.len());
    for port in first.charging_ports.into_iter().chain(second.charging_ports) {
        if !charging_ports.contains(&port) {
            charging_ports.push(port);
        }
    }

    ChargingPortGroup {
        charging_ports,
        network_id,
    }
}

/// Combine the charging points of two merged stations.
///
/// Points are matched by network id when both sides carry ids, otherwise by
/// name when either side carries names. Points without the matching key are
/// dropped. With no key at all, differing counts are kept side by side and
/// equal counts keep the first side only.
pub fn combine_charging_points(first: Vec<ChargingPoint>, second: Vec<ChargingPoint>) -> Vec<ChargingPoint> {
    if first.is_empty() {
        return second;
    }
    if second.is_empty() {
        return first;
    }

    let first_has_ids = first.iter().any(|point| point.network_key().is_some());
    let second_has_ids = second.iter().any(|point| point.network_key().is_some());
    if first_has_ids && second_has_ids {
        let points = first.into_iter().chain(second).collect();
        return fold_by_key(points, ChargingPoint::network_key, merge_charging_point);
    }

    let has_names = first
        .iter()
        .chain(second.iter())
        .any(|point| point.name_key().is_some());
    if has_names {
        let points = first.into_iter().chain(second).collect();
        return fold_by_key(points, ChargingPoint::name_key, merge_charging_point);
    }

    if first.len() != second.len() {
        let mut points = first;
        points.extend(second);
        return points;
    }

    first
}

/// Combine the port groups of two merged charging points, keyed by network id.
pub fn combine_charging_port_groups(
    first: Vec<ChargingPortGroup>,
    second: Vec<ChargingPortGroup>,
) -> Vec<ChargingPortGroup> {
    if first.is_empty() {
        return second;
    }
    if second.is_empty() {
        return first;
    }

    let any_keyed = first.iter().chain(second.iter()).any(|group| group.key().is_some());
    if !any_keyed {
        return first;
    }

    let groups = first.into_iter().chain(second).collect();
    fold_by_key(
        groups,
        |group: &ChargingPortGroup| group.key().map(str::to_string),
        merge_charging_port_group,
    )
}

/// Group items by key in first-seen order and fold each group left to right.
/// Items without a key are dropped.
fn fold_by_key<T, K, F, M>(items: Vec<T>, key: F, merge: M) -> Vec<T>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> Option<K>,
    M: Fn(T, T) -> T,
{
    let mut order: Vec<K> = Vec::new();
    let mut groups: HashMap<K, T> = HashMap::new();
    let mut dropped = 0usize;

    for item in items {
        let Some(k) = key(&item) else {
            dropped += 1;
            continue;
        };
        match groups.remove(&k) {
            Some(existing) => {
                groups.insert(k, merge(existing, item));
            }
            None => {
                order.push(k.clone());
                groups.insert(k, item);
            }
        }
    }

    if dropped > 0 {
        debug!(dropped, "Dropped unkeyed items while combining");
    }

    order.into_iter().filter_map(|k| groups.remove(&k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChargingPort, Location, PlugType, SourceQuality, SourceRef};

    fn source(system: &str) -> SourceRef {
        SourceRef::new(system, SourceQuality::Original)
    }

    fn point(system: &str, name: &str, network_id: &str) -> ChargingPoint {
        let mut point = ChargingPoint {
            name: name.to_string(),
            ..Default::default()
        };
        point.network_id.set_from(&source(system), network_id.to_string());
        point
    }

    fn group(network_id: Option<&str>, plugs: &[PlugType]) -> ChargingPortGroup {
        ChargingPortGroup {
            charging_ports: plugs.iter().map(|plug| ChargingPort { plug: *plug }).collect(),
            network_id: network_id.map(str::to_string),
        }
    }

    fn station(system: &str, network: Option<ChargingNetwork>) -> Station {
        let mut station = Station {
            network,
            ..Default::default()
        };
        station.name.set_from(&source(system), format!("{} station", system));
        station.location.set_from(&source(system), Location::new(42.0, -71.0));
        station
    }

    #[test]
    fn merge_station_unions_every_attribute() {
        let mut first = station("nrel", None);
        first.nrel_id.set_from(&source("nrel"), 100);
        let mut second = station("osm", None);
        second.osm_id.set_from(&source("osm"), "node:55".to_string());
        second.nrel_id.set_from(&source("osm"), 100);

        let merged = merge_station(first, second, NetworkConflictPolicy::default()).unwrap();

        assert_eq!(merged.nrel_id.all(), vec![100]);
        assert_eq!(merged.nrel_id.len(), 2);
        assert_eq!(merged.osm_id.all(), vec!["node:55".to_string()]);
        assert_eq!(merged.name.len(), 2);
        assert!(merged.osm_id.is_multi());
    }

    #[test]
    fn single_reported_network_is_kept() {
        let merged = merge_station(
            station("a", Some(ChargingNetwork::Blink)),
            station("b", None),
            NetworkConflictPolicy::Reject,
        )
        .unwrap();
        assert_eq!(merged.network, Some(ChargingNetwork::Blink));
    }

    #[test]
    fn network_conflict_policies() {
        let first = station("a", Some(ChargingNetwork::Blink));
        let second = station("b", Some(ChargingNetwork::Evgo));

        let preferred_second =
            merge_station(first.clone(), second.clone(), NetworkConflictPolicy::PreferSecond).unwrap();
        assert_eq!(preferred_second.network, Some(ChargingNetwork::Evgo));

        let preferred_first =
            merge_station(first.clone(), second.clone(), NetworkConflictPolicy::PreferFirst).unwrap();
        assert_eq!(preferred_first.network, Some(ChargingNetwork::Blink));

        let rejected = merge_station(first, second, NetworkConflictPolicy::Reject);
        assert!(matches!(rejected, Err(ReconcileError::NetworkConflict { .. })));
    }

    #[test]
    fn one_empty_side_returns_the_other() {
        let points = vec![point("cp", "A", "US*CPI*E1")];
        assert_eq!(combine_charging_points(points.clone(), Vec::new()), points);
        assert_eq!(combine_charging_points(Vec::new(), points.clone()), points);
    }

    #[test]
    fn points_grouped_by_network_id_when_both_sides_have_ids() {
        let first = vec![point("a", "A", "US*CPI*E1"), point("a", "B", "US*CPI*E2")];
        let second = vec![point("b", "", "US*CPI*E2"), point("b", "C", "US*CPI*E3")];

        let combined = combine_charging_points(first, second);

        let keys: Vec<String> = combined.iter().filter_map(|p| p.network_key()).collect();
        assert_eq!(keys, vec!["US*CPI*E1", "US*CPI*E2", "US*CPI*E3"]);
        assert_eq!(combined[1].name, "B");
        assert_eq!(combined[1].network_id.len(), 2);
    }

    #[test]
    fn points_without_id_are_dropped_when_grouping_by_id() {
        let first = vec![point("a", "A", "X1"), point("a", "B", "")];
        let second = vec![point("b", "A", "X1")];

        let combined = combine_charging_points(first, second);
        assert_eq!(combined.len(), 1);
    }

    #[test]
    fn points_grouped_by_name_without_ids() {
        let first = vec![point("a", "Post 1", ""), point("a", "Post 2", "")];
        let second = vec![point("b", "Post 2", ""), point("b", "", "")];

        let combined = combine_charging_points(first, second);
        let names: Vec<&str> = combined.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Post 1", "Post 2"]);
    }

    #[test]
    fn unkeyed_points_of_different_counts_are_concatenated() {
        let first = vec![ChargingPoint::default()];
        let second = vec![ChargingPoint::default(), ChargingPoint::default()];
        assert_eq!(combine_charging_points(first, second).len(), 3);
    }

    #[test]
    fn unkeyed_points_of_equal_counts_keep_first_side() {
        let mut marker = ChargingPoint::default();
        marker.location.set_from(&source("a"), Location::new(1.0, 1.0));
        let first = vec![marker.clone()];
        let second = vec![ChargingPoint::default()];

        assert_eq!(combine_charging_points(first, second), vec![marker]);
    }

    #[test]
    fn port_groups_without_ids_keep_first_side() {
        let first = vec![group(None, &[PlugType::J1772])];
        let second = vec![group(None, &[PlugType::Nacs])];
        assert_eq!(combine_charging_port_groups(first.clone(), second), first);
    }

    #[test]
    fn port_groups_merge_by_network_id_and_dedupe_ports() {
        let first = vec![group(Some("E1"), &[PlugType::J1772Combo, PlugType::Chademo])];
        let second = vec![
            group(Some("E1"), &[PlugType::Chademo, PlugType::Nacs]),
            group(Some("E2"), &[PlugType::J1772]),
            group(None, &[PlugType::J1772]),
        ];

        let combined = combine_charging_port_groups(first, second);

        assert_eq!(combined.len(), 2);
        assert_eq!(
            combined[0],
            group(Some("E1"), &[PlugType::J1772Combo, PlugType::Chademo, PlugType::Nacs])
        );
        assert_eq!(combined[1], group(Some("E2"), &[PlugType::J1772]));
    }

    #[test]
    fn port_group_network_id_prefers_first_non_empty() {
        let merged = merge_charging_port_group(group(Some(""), &[]), group(Some("E9"), &[]));
        assert_eq!(merged.network_id.as_deref(), Some("E9"));

        let merged = merge_charging_port_group(group(Some("E1"), &[]), group(Some("E9"), &[]));
        assert_eq!(merged.network_id.as_deref(), Some("E1"));
    }

    #[test]
    fn charging_point_name_is_last_non_empty() {
        let merged = merge_charging_point(point("a", "Left", "X"), point("b", "", "X"));
        assert_eq!(merged.name, "Left");

        let merged = merge_charging_point(point("a", "Left", "X"), point("b", "Right", "X"));
        assert_eq!(merged.name, "Right");
    }
}
