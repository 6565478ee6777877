//! GeoJSON rendering of reconciled stations.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::constants::{AFDC_URL_BASE, LINK_NAME_AFDC, LINK_NAME_OCM, LINK_NAME_OSM, OCM_URL_BASE, OSM_URL_BASE};
use crate::domain::{
    AttributeValue, ChargingNetwork, ChargingPoint, PlugType, SourceQuality, SourcedAttribute, Station,
};

/// `node:123`, `way:456`, `relation:789`
static OSM_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(node|way|relation):(\d+)$").unwrap());

#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection",
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub geometry: Geometry,
    pub properties: StationProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point([f64; 2]),
    MultiPoint(Vec<[f64; 2]>),
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceTag {
    pub name: String,
    pub quality: SourceQuality,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourcedProperty<T> {
    pub value: T,
    pub source: SourceTag,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AddressFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

impl AddressFields {
    fn field_count(&self) -> usize {
        [&self.street_address, &self.city, &self.state, &self.zip_code]
            .iter()
            .filter(|field| field.is_some())
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourcedAddress {
    pub address: AddressFields,
    pub source: SourceTag,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Link {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortProperties {
    pub plug_type: PlugType,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChargingGroupProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    pub ports: Vec<PortProperties>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChargingPointProperties {
    pub charging_groups: Vec<ChargingGroupProperties>,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub network_id: Vec<SourcedProperty<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ocm_id: Vec<SourcedProperty<u64>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub osm_id: Vec<SourcedProperty<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nrel_id: Vec<SourcedProperty<u64>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StationProperties {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<SourcedProperty<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<ChargingNetwork>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub network_id: Vec<SourcedProperty<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<SourcedAddress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Link>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub charging_points: Vec<ChargingPointProperties>,
}

/// The catalog and its review subset.
#[derive(Debug, Clone)]
pub struct RenderedCatalog {
    pub stations: FeatureCollection,
    /// Stations carrying at most one external identifier.
    pub review: FeatureCollection,
}

/// Render stations in catalog order.
pub fn render_catalog(mut stations: Vec<Station>) -> RenderedCatalog {
    stations.sort_by(catalog_order);

    let mut features = Vec::with_capacity(stations.len());
    let mut review = Vec::new();

    for station in &stations {
        let feature = station_feature(station);
        if station.identifier_count() <= 1 {
            review.push(feature.clone());
        }
        features.push(feature);
    }

    RenderedCatalog {
        stations: FeatureCollection::new(features),
        review: FeatureCollection::new(review),
    }
}

/// Name, then network, then longitude of the canonical location.
fn catalog_order(first: &Station, second: &Station) -> Ordering {
    let key = |station: &Station| {
        (
            station.name.value().unwrap_or_default(),
            station.network.map(|n| n.as_str()).unwrap_or(""),
            station.location.value().map_or(0.0, |l| l.longitude),
        )
    };
    let (first_name, first_network, first_longitude) = key(first);
    let (second_name, second_network, second_longitude) = key(second);

    first_name
        .cmp(&second_name)
        .then_with(|| first_network.cmp(second_network))
        .then_with(|| first_longitude.total_cmp(&second_longitude))
}

pub fn station_feature(station: &Station) -> Feature {
    let properties = StationProperties {
        name: sourced_property(&station.name),
        network: station.network,
        network_id: sourced_property(&station.network_id),
        address: addresses(station),
        references: references(station),
        charging_points: charging_points(&station.charging_points),
    };

    Feature {
        kind: "Feature",
        geometry: geometry(station),
        properties,
    }
}

/// Facts ordered best source first, without repeating a (system, quality, value) triple.
pub fn sourced_property<T: AttributeValue>(attribute: &SourcedAttribute<T>) -> Vec<SourcedProperty<T>> {
    let mut ranked = attribute.ranked();
    ranked.dedup_by(|a, b| {
        a.source.system == b.source.system && a.source.quality == b.source.quality && a.value == b.value
    });

    ranked
        .into_iter()
        .map(|fact| SourcedProperty {
            value: fact.value.clone(),
            source: SourceTag {
                name: fact.source.system.clone(),
                quality: fact.source.quality,
            },
        })
        .collect()
}

/// One address object per reporting source.
fn addresses(station: &Station) -> Vec<SourcedAddress> {
    let mut by_source: BTreeMap<(String, SourceQuality), AddressFields> = BTreeMap::new();

    let mut collect = |attribute: &SourcedAttribute<String>, assign: fn(&mut AddressFields, String)| {
        let mut facts: Vec<_> = attribute.sourced_values().collect();
        facts.sort_by(|a, b| a.value.cmp(&b.value));
        for fact in facts {
            let entry = by_source
                .entry((fact.source.system.clone(), fact.source.quality))
                .or_default();
            assign(entry, fact.value.clone());
        }
    };

    collect(&station.street_address, |a, v| a.street_address = Some(v));
    collect(&station.city, |a, v| a.city = Some(v));
    collect(&station.state, |a, v| a.state = Some(v));
    collect(&station.zip_code, |a, v| a.zip_code = Some(v));

    let mut addresses: Vec<SourcedAddress> = by_source
        .into_iter()
        .map(|((name, quality), address)| SourcedAddress {
            address,
            source: SourceTag { name, quality },
        })
        .collect();

    addresses.sort_by(|a, b| {
        b.source
            .quality
            .cmp(&a.source.quality)
            .then_with(|| b.address.field_count().cmp(&a.address.field_count()))
            .then_with(|| a.source.name.cmp(&b.source.name))
    });
    addresses
}

fn references(station: &Station) -> Vec<Link> {
    let mut links = Vec::new();

    for osm_id in station.osm_id.all() {
        links.push(Link {
            name: LINK_NAME_OSM.to_string(),
            url: osm_url(&osm_id),
        });
    }
    for ocm_id in station.ocm_id.all() {
        links.push(Link {
            name: LINK_NAME_OCM.to_string(),
            url: format!("{}/{}", OCM_URL_BASE, ocm_id),
        });
    }
    for nrel_id in station.nrel_id.all() {
        links.push(Link {
            name: LINK_NAME_AFDC.to_string(),
            url: format!("{}/{}", AFDC_URL_BASE, nrel_id),
        });
    }

    links.sort();
    links
}

/// OSM ids are `<element type>:<id>`; a bare number is taken as a node.
pub fn osm_url(osm_id: &str) -> String {
    match OSM_ID.captures(osm_id) {
        Some(captures) => format!("{}/{}/{}", OSM_URL_BASE, &captures[1], &captures[2]),
        None => format!("{}/node/{}", OSM_URL_BASE, osm_id),
    }
}

fn charging_points(points: &[ChargingPoint]) -> Vec<ChargingPointProperties> {
    let mut ordered: Vec<&ChargingPoint> = points.iter().collect();
    ordered.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.network_id.value().unwrap_or_default().cmp(&b.network_id.value().unwrap_or_default()))
    });

    ordered
        .into_iter()
        .map(|point| ChargingPointProperties {
            charging_groups: point
                .charging_port_groups
                .iter()
                .map(|group| ChargingGroupProperties {
                    network_id: group.key().map(str::to_string),
                    ports: group
                        .charging_ports
                        .iter()
                        .map(|port| PortProperties { plug_type: port.plug })
                        .collect(),
                })
                .collect(),
            name: point.name.clone(),
            network_id: sourced_property(&point.network_id),
            ocm_id: sourced_property(&point.ocm_id),
            osm_id: sourced_property(&point.osm_id),
            nrel_id: sourced_property(&point.nrel_id),
        })
        .collect()
}

/// Charging-point coordinates when any are known, else the station's own.
fn geometry(station: &Station) -> Geometry {
    let mut coordinates: Vec<[f64; 2]> = station
        .charging_points
        .iter()
        .filter_map(|point| point.location.value())
        .map(|location| location.position())
        .collect();
    coordinates.sort_by(|a, b| a[0].total_cmp(&b[0]).then_with(|| a[1].total_cmp(&b[1])));
    coordinates.dedup();

    match coordinates.len() {
        0 => Geometry::Point(station.location.value().map_or([0.0, 0.0], |l| l.position())),
        1 => Geometry::Point(coordinates[0]),
        _ => Geometry::MultiPoint(coordinates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChargingPortGroup, Location, SourceRef};
    use serde_json::json;

    fn source(system: &str, quality: SourceQuality) -> SourceRef {
        SourceRef::new(system, quality)
    }

    fn station(name: &str, network: Option<ChargingNetwork>, lon: f64) -> Station {
        let src = source("test", SourceQuality::Partner);
        let mut station = Station::default();
        station.name.set_from(&src, name.to_string());
        station.network = network;
        station.location.set_from(&src, Location::new(42.0, lon));
        station
    }

    #[test]
    fn sourced_values_rank_by_quality_and_drop_repeats() {
        let mut attribute = SourcedAttribute::single();
        attribute.set_from(&source("osm", SourceQuality::Aggregated), "b".to_string());
        attribute.set_from(&source("nrel", SourceQuality::Original), "a".to_string());
        // Same triple from a different record of the same source.
        attribute.set_from(
            &source("nrel", SourceQuality::Original).with_record_id("2"),
            "a".to_string(),
        );

        let rendered = serde_json::to_value(sourced_property(&attribute)).unwrap();
        assert_eq!(
            rendered,
            json!([
                {"value": "a", "source": {"name": "nrel", "quality": "ORIGINAL"}},
                {"value": "b", "source": {"name": "osm", "quality": "AGGREGATED"}}
            ])
        );
    }

    #[test]
    fn addresses_group_per_source_best_first() {
        let mut station = station("s", None, -71.0);
        let osm = source("osm", SourceQuality::Aggregated);
        let nrel = source("nrel", SourceQuality::Original);
        station.street_address.set_from(&osm, "1 Main Street".to_string());
        station.city.set_from(&osm, "Boston".to_string());
        station.street_address.set_from(&nrel, "1 Main Street".to_string());

        let rendered = addresses(&station);
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].source.name, "nrel");
        assert_eq!(rendered[1].address.field_count(), 2);
    }

    #[test]
    fn references_link_to_each_registry() {
        let mut station = station("s", None, -71.0);
        let src = source("osm", SourceQuality::Aggregated);
        station.osm_id.set_from(&src, "way:42".to_string());
        station.ocm_id.set_from(&src, 7);
        station.nrel_id.set_from(&src, 100);

        let urls: Vec<String> = references(&station).into_iter().map(|l| l.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://afdc.energy.gov/stations#/station/100".to_string(),
                "https://openchargemap.org/site/poi/details/7".to_string(),
                "https://www.openstreetmap.org/way/42".to_string(),
            ]
        );
    }

    #[test]
    fn geometry_uses_distinct_charging_point_coordinates() {
        let mut station = station("s", None, -71.0);
        let src = source("test", SourceQuality::Partner);
        for lon in [-71.2, -71.1, -71.2] {
            let mut point = ChargingPoint::default();
            point.location.set_from(&src, Location::new(42.0, lon));
            station.charging_points.push(point);
        }
        assert_eq!(
            geometry(&station),
            Geometry::MultiPoint(vec![[-71.2, 42.0], [-71.1, 42.0]])
        );

        station.charging_points.truncate(1);
        assert_eq!(geometry(&station), Geometry::Point([-71.2, 42.0]));

        station.charging_points[0] = ChargingPoint::default();
        assert_eq!(geometry(&station), Geometry::Point([-71.0, 42.0]));
    }

    #[test]
    fn catalog_is_sorted_and_review_holds_poorly_identified_stations() {
        let mut identified = station("b", Some(ChargingNetwork::Evgo), -71.0);
        let src = source("test", SourceQuality::Partner);
        identified.nrel_id.set_from(&src, 1);
        identified.network_id.set_from(&src, "E1".to_string());

        let stations = vec![
            identified,
            station("a", Some(ChargingNetwork::Blink), -70.0),
            station("a", Some(ChargingNetwork::Blink), -72.0),
        ];

        let catalog = render_catalog(stations);
        let longitudes: Vec<f64> = catalog
            .stations
            .features
            .iter()
            .map(|f| match &f.geometry {
                Geometry::Point(position) => position[0],
                Geometry::MultiPoint(_) => f64::NAN,
            })
            .collect();

        assert_eq!(longitudes, vec![-72.0, -70.0, -71.0]);
        assert_eq!(catalog.review.len(), 2);
    }

    #[test]
    fn feature_serializes_as_geojson() {
        let mut station = station("Depot", Some(ChargingNetwork::Chargepoint), -71.0);
        let mut point = ChargingPoint {
            name: "Post".to_string(),
            ..ChargingPoint::default()
        };
        let mut group = ChargingPortGroup::new(vec![crate::domain::ChargingPort { plug: PlugType::J1772 }]);
        group.network_id = Some("G1".to_string());
        point.charging_port_groups.push(group);
        station.charging_points.push(point);

        let value = serde_json::to_value(station_feature(&station)).unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["geometry"], json!({"type": "Point", "coordinates": [-71.0, 42.0]}));
        assert_eq!(value["properties"]["network"], "CHARGEPOINT");
        assert_eq!(
            value["properties"]["charging_points"][0]["charging_groups"],
            json!([{"network_id": "G1", "ports": [{"plug_type": "J1772"}]}])
        );
        assert!(value["properties"].get("references").is_none());
    }
}
