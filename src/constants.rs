/// Matching distance thresholds, in miles.
///
/// These are empirically tuned trade-offs between collapsing two distinct
/// nearby stations and leaving one station's scraped pins split. They are
/// fixed; changing any of them changes the catalog.
pub mod thresholds {
    /// Consolidation of vendor duplicates within one network (Tesla sites)
    pub const SAME_NETWORK_SITE_MILES: f64 = 0.1;
    /// Same network, overlapping street address
    pub const NETWORKED_SAME_ADDRESS_MILES: f64 = 0.5;
    /// Same network, only one side has an address
    pub const NETWORKED_ONE_ADDRESS_MILES: f64 = 0.05;
    /// Same network, neither side has an address
    pub const NETWORKED_NO_ADDRESS_MILES: f64 = 0.01;
    /// Non-networked, overlapping street address
    pub const NON_NETWORKED_SAME_ADDRESS_MILES: f64 = 0.1;
    /// Non-networked, no address requirement
    pub const NON_NETWORKED_CLOSE_BY_MILES: f64 = 0.01;
    /// Unknown-network station absorbed by a resolved neighbour
    pub const UNKNOWN_NETWORK_RESCUE_MILES: f64 = 0.01;
    /// NREL non-networked listing of a network NREL does not carry
    pub const UNSUPPORTED_NETWORK_RESCUE_MILES: f64 = 0.5;
}

/// Reference system names used by adapters in `references[].system`.
pub const REFERENCE_AFDC: &str = "ALTERNATIVE_FUEL_DATA_CENTER";
pub const REFERENCE_OSM: &str = "OPEN_STREET_MAP";
pub const REFERENCE_OCM: &str = "OPEN_CHARGE_MAP";

/// Reference names as rendered in output links.
pub const LINK_NAME_OSM: &str = "OPEN_STREET_MAP";
pub const LINK_NAME_OCM: &str = "OPEN_CHARGE_MAP";
pub const LINK_NAME_AFDC: &str = "ALTERNATIVE_FUELS_DATA_CENTER";

pub const OSM_URL_BASE: &str = "https://www.openstreetmap.org";
pub const OCM_URL_BASE: &str = "https://openchargemap.org/site/poi/details";
pub const AFDC_URL_BASE: &str = "https://afdc.energy.gov/stations#/station";

/// Default file names
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_DATA_DIR: &str = "scraped_data";
pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const DEFAULT_STATIONS_FILE: &str = "stations.geojson";
pub const DEFAULT_REVIEW_FILE: &str = "non-reconciled-stations.geojson";
pub const DEFAULT_SUMMARY_FILE: &str = "reconcile-summary.json";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Environment overrides
pub const ENV_DATA_DIR: &str = "EV_RECONCILE_DATA_DIR";
pub const ENV_OUTPUT_DIR: &str = "EV_RECONCILE_OUTPUT_DIR";
