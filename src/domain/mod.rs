//! Station data model shared by parsing, reconciliation and rendering.

pub mod location;
pub mod network;
pub mod provenance;
pub mod station;

pub use location::{Distance, Location};
pub use network::{ChargingNetwork, PlugType};
pub use provenance::{AttributeValue, SourceQuality, SourceRef, SourcedAttribute, SourcedValue};
pub use station::{ChargingPoint, ChargingPort, ChargingPortGroup, Station};
