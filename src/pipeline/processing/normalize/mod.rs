//! Text canonicalization applied to raw facts before they are recorded.

pub mod address;

pub use address::normalize_street_address;
