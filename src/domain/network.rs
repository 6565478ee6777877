use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Charging network operators known to the catalog.
///
/// This is a closed set: an adapter emitting a name outside it produces a
/// malformed record, never a silently unknown network.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargingNetwork {
    Abm,
    AmpUp,
    AmpedUp,
    Autel,
    Blink,
    Chargepoint,
    ChargeLab,
    ChargesmartEv,
    Eaton,
    ElectricEra,
    ElectrifyAmerica,
    EnelX,
    EvConnect,
    EvGateway,
    EvPassport,
    Evgo,
    Flo,
    FordCharge,
    #[serde(alias = "GREEN_SPOT")]
    Greenspot,
    Loop,
    Noodoe,
    PowerChargeConnect,
    RedE,
    RivianAdventure,
    SevenCharge,
    ShellRecharge,
    Skycharger,
    Swtch,
    TeslaDestination,
    TeslaSupercharger,
    TurnOnGreen,
    Volta,
    /// Explicitly reported as not belonging to any network.
    NonNetworked,
}

impl ChargingNetwork {
    pub const ALL: [ChargingNetwork; 33] = [
        ChargingNetwork::Abm,
        ChargingNetwork::AmpUp,
        ChargingNetwork::AmpedUp,
        ChargingNetwork::Autel,
        ChargingNetwork::Blink,
        ChargingNetwork::Chargepoint,
        ChargingNetwork::ChargeLab,
        ChargingNetwork::ChargesmartEv,
        ChargingNetwork::Eaton,
        ChargingNetwork::ElectricEra,
        ChargingNetwork::ElectrifyAmerica,
        ChargingNetwork::EnelX,
        ChargingNetwork::EvConnect,
        ChargingNetwork::EvGateway,
        ChargingNetwork::EvPassport,
        ChargingNetwork::Evgo,
        ChargingNetwork::Flo,
        ChargingNetwork::FordCharge,
        ChargingNetwork::Greenspot,
        ChargingNetwork::Loop,
        ChargingNetwork::Noodoe,
        ChargingNetwork::PowerChargeConnect,
        ChargingNetwork::RedE,
        ChargingNetwork::RivianAdventure,
        ChargingNetwork::SevenCharge,
        ChargingNetwork::ShellRecharge,
        ChargingNetwork::Skycharger,
        ChargingNetwork::Swtch,
        ChargingNetwork::TeslaDestination,
        ChargingNetwork::TeslaSupercharger,
        ChargingNetwork::TurnOnGreen,
        ChargingNetwork::Volta,
        ChargingNetwork::NonNetworked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChargingNetwork::Abm => "ABM",
            ChargingNetwork::AmpUp => "AMP_UP",
            ChargingNetwork::AmpedUp => "AMPED_UP",
            ChargingNetwork::Autel => "AUTEL",
            ChargingNetwork::Blink => "BLINK",
            ChargingNetwork::Chargepoint => "CHARGEPOINT",
            ChargingNetwork::ChargeLab => "CHARGE_LAB",
            ChargingNetwork::ChargesmartEv => "CHARGESMART_EV",
            ChargingNetwork::Eaton => "EATON",
            ChargingNetwork::ElectricEra => "ELECTRIC_ERA",
            ChargingNetwork::ElectrifyAmerica => "ELECTRIFY_AMERICA",
            ChargingNetwork::EnelX => "ENEL_X",
            ChargingNetwork::EvConnect => "EV_CONNECT",
            ChargingNetwork::EvGateway => "EV_GATEWAY",
            ChargingNetwork::EvPassport => "EV_PASSPORT",
            ChargingNetwork::Evgo => "EVGO",
            ChargingNetwork::Flo => "FLO",
            ChargingNetwork::FordCharge => "FORD_CHARGE",
            ChargingNetwork::Greenspot => "GREENSPOT",
            ChargingNetwork::Loop => "LOOP",
            ChargingNetwork::Noodoe => "NOODOE",
            ChargingNetwork::PowerChargeConnect => "POWER_CHARGE_CONNECT",
            ChargingNetwork::RedE => "RED_E",
            ChargingNetwork::RivianAdventure => "RIVIAN_ADVENTURE",
            ChargingNetwork::SevenCharge => "SEVEN_CHARGE",
            ChargingNetwork::ShellRecharge => "SHELL_RECHARGE",
            ChargingNetwork::Skycharger => "SKYCHARGER",
            ChargingNetwork::Swtch => "SWTCH",
            ChargingNetwork::TeslaDestination => "TESLA_DESTINATION",
            ChargingNetwork::TeslaSupercharger => "TESLA_SUPERCHARGER",
            ChargingNetwork::TurnOnGreen => "TURN_ON_GREEN",
            ChargingNetwork::Volta => "VOLTA",
            ChargingNetwork::NonNetworked => "NON_NETWORKED",
        }
    }

    pub fn is_networked(&self) -> bool {
        *self != ChargingNetwork::NonNetworked
    }
}

impl fmt::Display for ChargingNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargingNetwork {
    type Err = String;

    /// Accepts the canonical names plus `GREEN_SPOT`, which the Greenspot
    /// and OpenStreetMap adapters emit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "GREEN_SPOT" {
            return Ok(ChargingNetwork::Greenspot);
        }
        ChargingNetwork::ALL
            .iter()
            .find(|network| network.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown charging network '{}'", s))
    }
}

/// Connector standards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlugType {
    #[serde(rename = "J1772")]
    J1772,
    #[serde(rename = "J1772_SOCKET")]
    J1772Socket,
    #[serde(rename = "J1772_COMBO")]
    J1772Combo,
    #[serde(rename = "CHADEMO")]
    Chademo,
    #[serde(rename = "NACS")]
    Nacs,
}

impl PlugType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlugType::J1772 => "J1772",
            PlugType::J1772Socket => "J1772_SOCKET",
            PlugType::J1772Combo => "J1772_COMBO",
            PlugType::Chademo => "CHADEMO",
            PlugType::Nacs => "NACS",
        }
    }
}

impl fmt::Display for PlugType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlugType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "J1772" | "J1772_CABLE" | "J1722_CABLE" => Ok(PlugType::J1772),
            "J1772_SOCKET" => Ok(PlugType::J1772Socket),
            "J1772_COMBO" => Ok(PlugType::J1772Combo),
            "CHADEMO" => Ok(PlugType::Chademo),
            "NACS" => Ok(PlugType::Nacs),
            other => Err(format!("unknown plug type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_names_round_trip_through_from_str() {
        for network in ChargingNetwork::ALL {
            assert_eq!(network.as_str().parse::<ChargingNetwork>(), Ok(network));
        }
    }

    #[test]
    fn serde_names_match_display_names() {
        for network in ChargingNetwork::ALL {
            let encoded = serde_json::to_value(network).unwrap();
            assert_eq!(encoded, serde_json::json!(network.as_str()));
        }
    }

    #[test]
    fn unknown_network_is_rejected() {
        assert!("MYSTERY_NET".parse::<ChargingNetwork>().is_err());
    }

    #[test]
    fn green_spot_spelling_maps_to_greenspot() {
        assert_eq!("GREEN_SPOT".parse::<ChargingNetwork>(), Ok(ChargingNetwork::Greenspot));

        let decoded: ChargingNetwork = serde_json::from_str("\"GREEN_SPOT\"").unwrap();
        assert_eq!(decoded, ChargingNetwork::Greenspot);
        assert_eq!(ChargingNetwork::Greenspot.to_string(), "GREENSPOT");
    }

    #[test]
    fn cable_aliases_map_to_j1772() {
        assert_eq!("J1772_CABLE".parse::<PlugType>(), Ok(PlugType::J1772));
        assert_eq!("J1722_CABLE".parse::<PlugType>(), Ok(PlugType::J1772));
        assert!("TYPE2".parse::<PlugType>().is_err());
    }

    #[test]
    fn only_non_networked_is_not_networked() {
        assert!(!ChargingNetwork::NonNetworked.is_networked());
        assert!(ChargingNetwork::Chargepoint.is_networked());
    }
}
