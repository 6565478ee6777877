use std::collections::BTreeSet;

use crate::constants::thresholds;
use crate::domain::{ChargingNetwork, Station};

use super::distance::within_miles;

pub type Predicate = Box<dyn Fn(&Station, &Station) -> bool + Send + Sync>;
pub type PreFilter = Box<dyn Fn(&Station) -> bool + Send + Sync>;

/// How a pass combines a matched pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Plain `merge_station` under the run's network-conflict policy.
    Standard,
    /// The networked side's network is adopted by both records before merging.
    AdoptKnownNetwork,
}

/// One stage of the reconciliation pipeline.
pub struct MatchPass {
    pub name: &'static str,
    predicate: Predicate,
    filters: Vec<PreFilter>,
    pub strategy: MergeStrategy,
}

impl MatchPass {
    pub fn new<P>(name: &'static str, predicate: P) -> Self
    where
        P: Fn(&Station, &Station) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            predicate: Box::new(predicate),
            filters: Vec::new(),
            strategy: MergeStrategy::Standard,
        }
    }

    /// Stations failing a filter skip this pass untouched.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Station) -> bool + Send + Sync + 'static,
    {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn accepts(&self, station: &Station) -> bool {
        self.filters.iter().all(|filter| filter(station))
    }

    pub fn matches(&self, first: &Station, second: &Station) -> bool {
        (self.predicate)(first, second)
    }
}

impl std::fmt::Debug for MatchPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchPass")
            .field("name", &self.name)
            .field("filters", &self.filters.len())
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// Networks the non-networked NREL listings are known to stand in for.
pub const NREL_UNSUPPORTED_NETWORKS: [ChargingNetwork; 3] = [
    ChargingNetwork::AmpUp,
    ChargingNetwork::EnelX,
    ChargingNetwork::EvPassport,
];

/// Options that shape the pass list.
#[derive(Debug, Clone)]
pub struct PassOptions {
    /// Networks whose providers publish duplicate pins for one site
    pub consolidated_networks: Vec<ChargingNetwork>,
    /// Run the NREL unsupported-network rescue pass
    pub unsupported_network_rescue: bool,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            consolidated_networks: vec![ChargingNetwork::TeslaSupercharger, ChargingNetwork::TeslaDestination],
            unsupported_network_rescue: false,
        }
    }
}

fn overlaps<T: Ord>(first: Vec<T>, second: Vec<T>) -> bool {
    let first: BTreeSet<T> = first.into_iter().collect();
    second.into_iter().any(|value| first.contains(&value))
}

/// Both stations have the same real network.
pub fn networks_match(first: &Station, second: &Station) -> bool {
    first.has_known_network() && second.has_known_network() && first.network == second.network
}

pub fn shares_reference(first: &Station, second: &Station) -> bool {
    overlaps(first.osm_id.all(), second.osm_id.all())
        || overlaps(first.ocm_id.all(), second.ocm_id.all())
        || overlaps(first.nrel_id.all(), second.nrel_id.all())
}

pub fn shares_network_id(first: &Station, second: &Station) -> bool {
    if !networks_match(first, second) {
        return false;
    }
    let lowered = |station: &Station| -> Vec<String> {
        station.network_id.all().iter().map(|id| id.to_lowercase()).collect()
    };
    overlaps(lowered(first), lowered(second))
}

pub fn addresses_overlap(first: &Station, second: &Station) -> bool {
    overlaps(first.street_address_keys(), second.street_address_keys())
}

fn exactly_one_has_address(first: &Station, second: &Station) -> bool {
    first.has_street_address() != second.has_street_address()
}

fn neither_has_address(first: &Station, second: &Station) -> bool {
    !first.has_street_address() && !second.has_street_address()
}

pub fn networked_same_address(first: &Station, second: &Station) -> bool {
    networks_match(first, second)
        && addresses_overlap(first, second)
        && within_miles(first, second, thresholds::NETWORKED_SAME_ADDRESS_MILES)
}

pub fn networked_one_address(first: &Station, second: &Station) -> bool {
    networks_match(first, second)
        && exactly_one_has_address(first, second)
        && within_miles(first, second, thresholds::NETWORKED_ONE_ADDRESS_MILES)
}

pub fn networked_no_address(first: &Station, second: &Station) -> bool {
    networks_match(first, second)
        && neither_has_address(first, second)
        && within_miles(first, second, thresholds::NETWORKED_NO_ADDRESS_MILES)
}

pub fn non_networked_same_address(first: &Station, second: &Station) -> bool {
    addresses_overlap(first, second)
        && within_miles(first, second, thresholds::NON_NETWORKED_SAME_ADDRESS_MILES)
}

pub fn non_networked_close_by(first: &Station, second: &Station) -> bool {
    within_miles(first, second, thresholds::NON_NETWORKED_CLOSE_BY_MILES)
}

pub fn unknown_near_networked(first: &Station, second: &Station) -> bool {
    let pairing = (first.has_unknown_network() && second.has_known_network())
        || (first.has_known_network() && second.has_unknown_network());
    pairing && within_miles(first, second, thresholds::UNKNOWN_NETWORK_RESCUE_MILES)
}

pub fn unknown_near_non_networked(first: &Station, second: &Station) -> bool {
    let pairing = (first.has_unknown_network() && second.is_non_networked())
        || (first.is_non_networked() && second.has_unknown_network());
    pairing && within_miles(first, second, thresholds::UNKNOWN_NETWORK_RESCUE_MILES)
}

fn is_unsupported_network(station: &Station) -> bool {
    station
        .network
        .map_or(false, |network| NREL_UNSUPPORTED_NETWORKS.contains(&network))
}

fn is_nrel_non_networked(station: &Station) -> bool {
    station.is_non_networked() && !station.nrel_id.is_empty()
}

pub fn nrel_listing_of_unsupported_network(first: &Station, second: &Station) -> bool {
    let pairing = (is_nrel_non_networked(first) && is_unsupported_network(second))
        || (is_unsupported_network(first) && is_nrel_non_networked(second));
    pairing
        && first.has_street_address()
        && second.has_street_address()
        && addresses_overlap(first, second)
        && within_miles(first, second, thresholds::UNSUPPORTED_NETWORK_RESCUE_MILES)
}

/// The ordered pass list. Each pass runs on the output of the previous one.
pub fn standard_passes(options: &PassOptions) -> Vec<MatchPass> {
    let mut passes = vec![
        MatchPass::new("cross_reference_identity", shares_reference),
        MatchPass::new("network_id_identity", shares_network_id)
            .filter(Station::has_known_network)
            .filter(|station| !station.network_id.is_empty()),
    ];

    let consolidated = options.consolidated_networks.clone();
    let consolidated_filter = consolidated.clone();
    passes.push(
        MatchPass::new("same_network_site", move |first, second| {
            first.network.is_some()
                && first.network == second.network
                && first.network.map_or(false, |network| consolidated.contains(&network))
                && within_miles(first, second, thresholds::SAME_NETWORK_SITE_MILES)
        })
        .filter(move |station| {
            station
                .network
                .map_or(false, |network| consolidated_filter.contains(&network))
        }),
    );

    if options.unsupported_network_rescue {
        passes.push(
            MatchPass::new("unsupported_network_rescue", nrel_listing_of_unsupported_network)
                .filter(|station| is_nrel_non_networked(station) || is_unsupported_network(station))
                .strategy(MergeStrategy::AdoptKnownNetwork),
        );
    }

    passes.extend([
        MatchPass::new("networked_same_address", networked_same_address)
            .filter(Station::has_known_network)
            .filter(Station::has_street_address),
        MatchPass::new("networked_one_address", networked_one_address).filter(Station::has_known_network),
        MatchPass::new("networked_no_address", networked_no_address).filter(Station::has_known_network),
        MatchPass::new("non_networked_same_address", non_networked_same_address)
            .filter(Station::is_non_networked)
            .filter(Station::has_street_address),
        MatchPass::new("non_networked_close_by", non_networked_close_by).filter(Station::is_non_networked),
        MatchPass::new("unknown_into_networked", unknown_near_networked)
            .filter(|station| !station.is_non_networked()),
        MatchPass::new("unknown_into_non_networked", unknown_near_non_networked),
    ]);

    passes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, SourceQuality, SourceRef};
    use crate::pipeline::processing::conflation::{reconcile_pass, NetworkConflictPolicy};

    fn station(system: &str, network: Option<ChargingNetwork>, lat: f64, lon: f64) -> Station {
        let source = SourceRef::new(system, SourceQuality::Original);
        let mut station = Station {
            network,
            ..Default::default()
        };
        station.location.set_from(&source, Location::new(lat, lon));
        station
    }

    fn with_address(mut station: Station, address: &str) -> Station {
        let source = SourceRef::new("addr", SourceQuality::Partner);
        station.street_address.set_from(&source, address.to_string());
        station
    }

    // 0.0001 degrees of latitude is roughly 0.0069 miles.
    const STEP: f64 = 0.0001;
    // Latitude offsets just inside and just outside 0.1 mile (0.0995 and 0.1005).
    const INSIDE_TENTH_MILE: f64 = 0.00144;
    const OUTSIDE_TENTH_MILE: f64 = 0.001455;

    fn run_pass(name: &str, stations: Vec<Station>) -> (usize, usize) {
        let pass = standard_passes(&PassOptions::default())
            .into_iter()
            .find(|pass| pass.name == name)
            .unwrap();
        let (result, report) = reconcile_pass(stations, &pass, NetworkConflictPolicy::Reject).unwrap();
        (result.len(), report.candidates)
    }

    #[test]
    fn pass_order_is_fixed() {
        let names: Vec<&str> = standard_passes(&PassOptions::default()).iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "cross_reference_identity",
                "network_id_identity",
                "same_network_site",
                "networked_same_address",
                "networked_one_address",
                "networked_no_address",
                "non_networked_same_address",
                "non_networked_close_by",
                "unknown_into_networked",
                "unknown_into_non_networked",
            ]
        );
    }

    #[test]
    fn rescue_pass_runs_after_site_consolidation_when_enabled() {
        let options = PassOptions {
            unsupported_network_rescue: true,
            ..Default::default()
        };
        let names: Vec<&str> = standard_passes(&options).iter().map(|p| p.name).collect();
        assert_eq!(names[3], "unsupported_network_rescue");
        assert_eq!(names.len(), 11);
    }

    #[test]
    fn network_id_match_is_case_insensitive_and_requires_same_network() {
        let source = SourceRef::new("a", SourceQuality::Original);
        let mut first = station("a", Some(ChargingNetwork::Evgo), 42.0, -71.0);
        first.network_id.set_from(&source, "ABC-1".to_string());
        let mut second = station("b", Some(ChargingNetwork::Evgo), 45.0, -71.0);
        second.network_id.set_from(&source, "abc-1".to_string());

        assert!(shares_network_id(&first, &second));

        second.network = Some(ChargingNetwork::Blink);
        assert!(!shares_network_id(&first, &second));
    }

    #[test]
    fn non_networked_never_matches_as_networked() {
        let first = station("a", Some(ChargingNetwork::NonNetworked), 42.0, -71.0);
        let second = station("b", Some(ChargingNetwork::NonNetworked), 42.0, -71.0);
        assert!(!networks_match(&first, &second));
        assert!(!networked_no_address(&first, &second));
    }

    #[test]
    fn networked_address_passes_respect_thresholds() {
        let network = Some(ChargingNetwork::Chargepoint);
        let first = with_address(station("a", network, 42.0, -71.0), "123 Main Street");
        let near = with_address(station("b", network, 42.0 + 5.0 * STEP, -71.0), "123 MAIN STREET");
        let far = with_address(station("c", network, 42.01, -71.0), "123 Main Street");

        assert!(networked_same_address(&first, &near));
        assert!(!networked_same_address(&first, &far));

        let bare_near = station("d", network, 42.0 + 10.0 * STEP, -71.0);
        let bare_close = station("e", network, 42.0 + STEP, -71.0);
        assert!(networked_one_address(&first, &bare_close));
        assert!(!networked_one_address(&first, &bare_near));
        assert!(!networked_one_address(&first, &near));

        let bare_origin = station("f", network, 42.0, -71.0);
        assert!(networked_no_address(&bare_origin, &bare_close));
        assert!(!networked_no_address(&bare_origin, &station("g", network, 42.0 + 2.0 * STEP, -71.0)));
    }

    #[test]
    fn unknown_rescue_pairs_exactly_one_unknown_side() {
        let unknown = station("osm", None, 42.0, -71.0);
        let networked = station("cp", Some(ChargingNetwork::Chargepoint), 42.0, -71.0);
        let non_networked = station("nrel", Some(ChargingNetwork::NonNetworked), 42.0, -71.0);

        assert!(unknown_near_networked(&unknown, &networked));
        assert!(unknown_near_networked(&networked, &unknown));
        assert!(!unknown_near_networked(&unknown, &unknown));
        assert!(!unknown_near_networked(&unknown, &non_networked));

        assert!(unknown_near_non_networked(&non_networked, &unknown));
        assert!(!unknown_near_non_networked(&non_networked, &networked));
    }

    #[test]
    fn nrel_listing_matches_unsupported_network_at_same_address() {
        let source = SourceRef::new("nrel", SourceQuality::Original);
        let mut listing = with_address(
            station("nrel", Some(ChargingNetwork::NonNetworked), 42.0, -71.0),
            "1 Elm Avenue",
        );
        listing.nrel_id.set_from(&source, 77);
        let ampup = with_address(station("ampup", Some(ChargingNetwork::AmpUp), 42.001, -71.0), "1 elm avenue");
        let blink = with_address(station("blink", Some(ChargingNetwork::Blink), 42.001, -71.0), "1 Elm Avenue");

        assert!(nrel_listing_of_unsupported_network(&listing, &ampup));
        assert!(nrel_listing_of_unsupported_network(&ampup, &listing));
        assert!(!nrel_listing_of_unsupported_network(&listing, &blink));
    }

    #[test]
    fn same_network_site_merges_tesla_pins_up_to_a_tenth_of_a_mile() {
        for network in [ChargingNetwork::TeslaSupercharger, ChargingNetwork::TeslaDestination] {
            let inside = vec![
                station("a", Some(network), 42.0, -71.0),
                station("b", Some(network), 42.0 + INSIDE_TENTH_MILE, -71.0),
            ];
            assert_eq!(run_pass("same_network_site", inside), (1, 2), "{}", network);

            let outside = vec![
                station("a", Some(network), 42.0, -71.0),
                station("b", Some(network), 42.0 + OUTSIDE_TENTH_MILE, -71.0),
            ];
            assert_eq!(run_pass("same_network_site", outside), (2, 2), "{}", network);
        }
    }

    #[test]
    fn same_network_site_ignores_networks_not_consolidated() {
        // About 0.05 mile apart with no address.
        let blink = vec![
            station("a", Some(ChargingNetwork::Blink), 42.0, -71.0),
            station("b", Some(ChargingNetwork::Blink), 42.0007, -71.0),
        ];
        assert_eq!(run_pass("same_network_site", blink), (2, 0));

        let mixed = vec![
            station("a", Some(ChargingNetwork::TeslaSupercharger), 42.0, -71.0),
            station("b", Some(ChargingNetwork::TeslaDestination), 42.0, -71.0),
        ];
        assert_eq!(run_pass("same_network_site", mixed), (2, 2));
    }

    #[test]
    fn non_networked_same_address_needs_overlap_within_a_tenth_of_a_mile() {
        let non_networked = Some(ChargingNetwork::NonNetworked);
        let origin = || with_address(station("a", non_networked, 42.0, -71.0), "1 Library Place");

        let inside = vec![
            origin(),
            with_address(
                station("b", non_networked, 42.0 + INSIDE_TENTH_MILE, -71.0),
                "1 LIBRARY PLACE",
            ),
        ];
        assert_eq!(run_pass("non_networked_same_address", inside), (1, 2));

        let outside = vec![
            origin(),
            with_address(
                station("b", non_networked, 42.0 + OUTSIDE_TENTH_MILE, -71.0),
                "1 Library Place",
            ),
        ];
        assert_eq!(run_pass("non_networked_same_address", outside), (2, 2));

        let other_address = vec![
            origin(),
            with_address(station("b", non_networked, 42.0, -71.0), "2 Library Place"),
        ];
        assert_eq!(run_pass("non_networked_same_address", other_address), (2, 2));
    }

    #[test]
    fn non_networked_same_address_skips_networked_and_unknown_stations() {
        let stations = vec![
            with_address(station("a", Some(ChargingNetwork::NonNetworked), 42.0, -71.0), "1 Elm Avenue"),
            with_address(station("b", None, 42.0, -71.0), "1 Elm Avenue"),
            with_address(station("c", Some(ChargingNetwork::Blink), 42.0, -71.0), "1 Elm Avenue"),
        ];
        assert_eq!(run_pass("non_networked_same_address", stations), (3, 1));
    }
}
