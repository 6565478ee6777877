//! Maps provider records into the station model.

pub mod raw;

use tracing::debug;

use crate::constants::{REFERENCE_AFDC, REFERENCE_OCM, REFERENCE_OSM};
use crate::domain::{
    ChargingNetwork, ChargingPoint, ChargingPort, ChargingPortGroup, Location, PlugType, SourceRef, Station,
};
use crate::error::{ReconcileError, Result};
use crate::pipeline::processing::normalize::normalize_street_address;

pub use raw::{RawChargingPoint, RawIdentifier, RawLocation, RawNumber, RawReference, RawStation};

pub trait Parser {
    /// Parse every record of one provider file. `file` names the file in errors.
    fn parse(&self, file: &str, records: Vec<serde_json::Value>) -> Result<Vec<Station>>;
}

/// Parser for the canonical raw-station shape shared by all adapters.
#[derive(Debug, Default, Clone, Copy)]
pub struct StationParser;

impl Parser for StationParser {
    fn parse(&self, file: &str, records: Vec<serde_json::Value>) -> Result<Vec<Station>> {
        let mut stations = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            let malformed = |message: String| ReconcileError::MalformedRecord {
                file: file.to_string(),
                index,
                message,
            };

            let raw: RawStation = serde_json::from_value(record).map_err(|e| malformed(e.to_string()))?;
            stations.push(station_from_raw(raw).map_err(malformed)?);
        }

        debug!(file, count = stations.len(), "Parsed provider records");
        Ok(stations)
    }
}

/// Build a station from one raw record. Every fact is tagged with the
/// record's source.
pub fn station_from_raw(raw: RawStation) -> std::result::Result<Station, String> {
    let source = source_ref(&raw);
    let mut station = Station::default();

    if let Some(name) = raw.name {
        station.name.set_from(&source, name);
    }

    station.location.set_from(&source, location_from_raw(&raw.location)?);

    if let Some(network_id) = &raw.network_id {
        station.network_id.set_from(&source, network_id.to_string());
    }

    station.network = match raw.network.as_deref() {
        None | Some("") => None,
        Some(name) => Some(name.parse::<ChargingNetwork>()?),
    };

    if let Some(address) = raw.address {
        if let Some(street_address) = address.street_address {
            if !street_address.trim().is_empty() {
                station
                    .street_address
                    .set_from(&source, normalize_street_address(&street_address));
            }
        }
        if let Some(city) = address.city {
            station.city.set_from(&source, city);
        }
        if let Some(state) = address.state {
            station.state.set_from(&source, state);
        }
        if let Some(zip_code) = address.zip_code {
            station.zip_code.set_from(&source, zip_code);
        }
    }

    for reference in &raw.references {
        match reference.system.as_str() {
            REFERENCE_AFDC => station.nrel_id.set_from(&source, numeric_id(reference)?),
            REFERENCE_OSM => station.osm_id.set_from(&source, reference.identifier.to_string()),
            REFERENCE_OCM => station.ocm_id.set_from(&source, numeric_id(reference)?),
            other => debug!(system = other, "Ignoring reference to unsupported system"),
        }
    }

    station.charging_points = raw
        .charging_points
        .into_iter()
        .map(|point| charging_point_from_raw(point, &source))
        .collect::<std::result::Result<_, _>>()?;

    Ok(station)
}

fn charging_point_from_raw(raw: RawChargingPoint, source: &SourceRef) -> std::result::Result<ChargingPoint, String> {
    let mut point = ChargingPoint {
        name: raw.name.unwrap_or_default(),
        ..ChargingPoint::default()
    };

    if let Some(location) = &raw.location {
        point.location.set_from(source, location_from_raw(location)?);
    }

    if let Some(network_id) = &raw.network_id {
        point.network_id.set_from(source, network_id.to_string());
    }

    for reference in &raw.references {
        match reference.system.as_str() {
            REFERENCE_AFDC => point.nrel_id.set_from(source, numeric_id(reference)?),
            REFERENCE_OSM => point.osm_id.set_from(source, reference.identifier.to_string()),
            REFERENCE_OCM => point.ocm_id.set_from(source, numeric_id(reference)?),
            _ => {}
        }
    }

    for evse in raw.evses {
        let mut ports = Vec::with_capacity(evse.plugs.len());
        for plug in evse.plugs {
            // Adapters emit null when a connector's standard is unknown.
            if let Some(name) = plug.plug.filter(|name| !name.is_empty()) {
                ports.push(ChargingPort {
                    plug: name.parse::<PlugType>()?,
                });
            }
        }

        let mut group = ChargingPortGroup::new(ports);
        group.network_id = evse.network_id.map(|id| id.to_string());
        point.charging_port_groups.push(group);
    }

    Ok(point)
}

fn source_ref(raw: &RawStation) -> SourceRef {
    let source = SourceRef::new(raw.source.system.clone(), raw.source.quality);
    let record_id = raw
        .network_id
        .as_ref()
        .map(|id| id.to_string())
        .filter(|id| !id.is_empty())
        .or_else(|| raw.references.first().map(|reference| reference.identifier.to_string()));

    match record_id {
        Some(record_id) => source.with_record_id(record_id),
        None => source,
    }
}

fn location_from_raw(raw: &RawLocation) -> std::result::Result<Location, String> {
    let latitude = raw
        .latitude
        .as_f64()
        .ok_or_else(|| format!("invalid latitude {:?}", raw.latitude))?;
    let longitude = raw
        .longitude
        .as_f64()
        .ok_or_else(|| format!("invalid longitude {:?}", raw.longitude))?;
    Ok(Location::new(latitude, longitude))
}

fn numeric_id(reference: &RawReference) -> std::result::Result<u64, String> {
    reference.identifier.as_u64().ok_or_else(|| {
        format!(
            "{} identifier '{}' is not numeric",
            reference.system, reference.identifier
        )
    })
}
