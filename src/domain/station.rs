use super::location::Location;
use super::network::{ChargingNetwork, PlugType};
use super::provenance::SourcedAttribute;

/// One physical connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChargingPort {
    pub plug: PlugType,
}

/// Ports energized together: one vehicle at a time (an EVSE).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChargingPortGroup {
    pub charging_ports: Vec<ChargingPort>,
    pub network_id: Option<String>,
}

impl ChargingPortGroup {
    pub fn new(charging_ports: Vec<ChargingPort>) -> Self {
        Self {
            charging_ports,
            network_id: None,
        }
    }

    /// The network id, treating an empty string as absent.
    pub fn key(&self) -> Option<&str> {
        self.network_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// One physical charging post or pedestal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChargingPoint {
    pub charging_port_groups: Vec<ChargingPortGroup>,

    pub name: String,
    pub location: SourcedAttribute<Location>,

    pub ocm_id: SourcedAttribute<u64>,
    pub osm_id: SourcedAttribute<String>,
    pub nrel_id: SourcedAttribute<u64>,

    pub network_id: SourcedAttribute<String>,
}

impl ChargingPoint {
    /// The reading of the network id used as a grouping key, if non-empty.
    pub fn network_key(&self) -> Option<String> {
        self.network_id.value().filter(|id| !id.is_empty())
    }

    pub fn name_key(&self) -> Option<String> {
        Some(self.name.clone()).filter(|name| !name.is_empty())
    }
}

/// A physical charging site.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub charging_points: Vec<ChargingPoint>,

    pub name: SourcedAttribute<String>,
    /// `None` when no source reported a network.
    pub network: Option<ChargingNetwork>,

    pub location: SourcedAttribute<Location>,
    pub street_address: SourcedAttribute<String>,
    pub city: SourcedAttribute<String>,
    pub state: SourcedAttribute<String>,
    pub zip_code: SourcedAttribute<String>,

    pub osm_id: SourcedAttribute<String>,
    pub nrel_id: SourcedAttribute<u64>,
    pub ocm_id: SourcedAttribute<u64>,

    pub network_id: SourcedAttribute<String>,
}

impl Default for Station {
    fn default() -> Self {
        Self {
            charging_points: Vec::new(),
            name: SourcedAttribute::single(),
            network: None,
            location: SourcedAttribute::single(),
            street_address: SourcedAttribute::single(),
            city: SourcedAttribute::single(),
            state: SourcedAttribute::single(),
            zip_code: SourcedAttribute::single(),
            osm_id: SourcedAttribute::multi(),
            nrel_id: SourcedAttribute::multi(),
            ocm_id: SourcedAttribute::multi(),
            network_id: SourcedAttribute::single(),
        }
    }
}

impl Station {
    /// Network is reported and is a real operator.
    pub fn has_known_network(&self) -> bool {
        self.network.map_or(false, |network| network.is_networked())
    }

    pub fn is_non_networked(&self) -> bool {
        self.network == Some(ChargingNetwork::NonNetworked)
    }

    pub fn has_unknown_network(&self) -> bool {
        self.network.is_none()
    }

    pub fn has_street_address(&self) -> bool {
        !self.street_address.is_empty()
    }

    /// Lower-cased street addresses, for case-insensitive overlap checks.
    pub fn street_address_keys(&self) -> Vec<String> {
        self.street_address.all().iter().map(|a| a.to_lowercase()).collect()
    }

    /// Any of the attributes a record can be recognised by.
    pub fn has_identifying_attribute(&self) -> bool {
        !(self.name.is_empty()
            && self.network_id.is_empty()
            && self.osm_id.is_empty()
            && self.nrel_id.is_empty()
            && self.ocm_id.is_empty()
            && self.street_address.is_empty())
    }

    /// How many kinds of external identifier this station carries.
    pub fn identifier_count(&self) -> usize {
        [
            !self.nrel_id.is_empty(),
            !self.osm_id.is_empty(),
            !self.ocm_id.is_empty(),
            !self.network_id.is_empty(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    /// Short human label for logs and error messages.
    pub fn label(&self) -> String {
        let name = self.name.value().unwrap_or_else(|| "<unnamed>".to_string());
        match self.network {
            Some(network) => format!("{} ({})", name, network),
            None => name,
        }
    }
}
