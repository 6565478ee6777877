// Pipeline processing: record parsing, address normalization, and conflation

pub mod conflation;
pub mod normalize;
pub mod parser;
