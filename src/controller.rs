//! The single owner of queue and playback state.
//!
//! Background loops talk to the controller only through the event channel.
//! User commands and `tick` run on the same thread, one after another.

mod cleanup;
mod commands;
mod notify;
mod state;

pub use notify::*;
pub use state::*;
