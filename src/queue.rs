//! Queue module: the track entity and the ordered queue that owns it.
//!
//! `TrackQueue` keeps tracks sorted by creation time, suppresses duplicate
//! feed emissions, trims to a soft capacity and maintains the current pointer.

mod manager;
mod model;

pub use manager::*;
pub use model::*;
