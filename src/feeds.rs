//! Feed polling: the `FeedSource` capability, a generic HTTP JSON source,
//! and the background pollers that turn feed items into queue events.

mod http;
mod oembed;
mod poller;
mod types;

pub use http::*;
pub use oembed::*;
pub use poller::*;
pub use types::*;
