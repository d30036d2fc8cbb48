//! Domain core for the storm impact analysis.
//!
//! Record types, category normalisation, damage reconstruction and the
//! shared error, settings and formatting helpers used by the data and
//! binary crates.

pub mod damage;
pub mod error;
pub mod formatting;
pub mod models;
pub mod normalize;
pub mod settings;

pub use error::{Result, StormError};
