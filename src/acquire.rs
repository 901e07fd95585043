//! Acquisition: materializing local artifacts for the current and next track.
//!
//! The controller publishes an `AcquisitionWindow` snapshot; the worker thread
//! reads it on a short interval, fetches what is missing and reports back
//! through the event channel.

mod fetcher;
mod naming;
mod worker;

pub use fetcher::*;
pub use naming::*;
pub use worker::*;

#[cfg(test)]
mod tests;
