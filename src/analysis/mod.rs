//! Aggregation layer: dashboard statistics computed from the loaded table.

pub mod aggregator;

pub use aggregator::*;
