//! Configuration loader and schema types.
//!
//! This module exposes the settings schema that drives the queue, pollers,
//! acquisition worker and playback, plus helpers to load and save it.

mod load;
mod schema;

pub use load::*;
pub use schema::*;
