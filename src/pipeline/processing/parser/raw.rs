//! Wire shape of a provider record, as emitted by the source adapters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::SourceQuality;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStation {
    #[serde(default)]
    pub name: Option<String>,
    pub location: RawLocation,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub network_id: Option<RawIdentifier>,
    #[serde(default)]
    pub address: Option<RawAddress>,
    #[serde(default)]
    pub references: Vec<RawReference>,
    #[serde(default)]
    pub charging_points: Vec<RawChargingPoint>,
    pub source: RawSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLocation {
    pub latitude: RawNumber,
    pub longitude: RawNumber,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAddress {
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReference {
    pub system: String,
    pub identifier: RawIdentifier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawChargingPoint {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<RawLocation>,
    #[serde(default)]
    pub network_id: Option<RawIdentifier>,
    #[serde(default)]
    pub references: Vec<RawReference>,
    #[serde(default)]
    pub evses: Vec<RawEvse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvse {
    #[serde(default)]
    pub network_id: Option<RawIdentifier>,
    #[serde(default)]
    pub plugs: Vec<RawPlug>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlug {
    #[serde(default)]
    pub plug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSource {
    pub system: String,
    pub quality: SourceQuality,
}

/// Providers disagree on whether ids are strings or numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawIdentifier {
    Number(u64),
    Text(String),
}

impl RawIdentifier {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            RawIdentifier::Number(n) => Some(*n),
            RawIdentifier::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for RawIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawIdentifier::Number(n) => write!(f, "{}", n),
            RawIdentifier::Text(s) => f.write_str(s),
        }
    }
}

/// Coordinates arrive as JSON numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            RawNumber::Number(n) => *n,
            RawNumber::Text(s) => s.trim().parse().ok()?,
        };
        Some(value).filter(|v| v.is_finite())
    }
}
