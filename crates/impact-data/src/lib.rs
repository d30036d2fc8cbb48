//! Data layer for the storm impact analysis.
//!
//! Responsible for reading the storm events CSV export, filtering it to the
//! analysis window, aggregating per-category statistics and running the
//! top-level analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod reader;

pub use impact_core as core;
