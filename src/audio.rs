//! Playback: the adapter seam the controller drives, and the rodio output
//! behind it.

mod adapter;
mod probe;
mod sink;

pub use adapter::*;
pub use probe::*;
pub use sink::*;

#[cfg(test)]
mod tests;
