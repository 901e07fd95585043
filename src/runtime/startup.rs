use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config;
use crate::controller::Controller;
use crate::events::EventSender;
use crate::feeds::{HttpFeed, Pollers, TitleLookup};
use crate::store::Store;

/// `RUST_LOG` wins over the configured filter.
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

pub fn build_pollers(settings: &config::Settings, events: EventSender, store: Store) -> Pollers {
    let mut pollers = Pollers::new(
        events,
        store,
        Duration::from_secs(settings.polling.interval_secs),
    );
    let timeout = Duration::from_secs(settings.polling.timeout_secs);
    for feed in &settings.feeds {
        let mut source = HttpFeed::new(feed.name.clone(), feed.url.clone(), feed.cursor, timeout);
        if feed.lookup_titles {
            source = source.with_title_lookup(TitleLookup::new(timeout));
        }
        pollers.add_feed(Arc::new(source), feed.token.clone());
    }
    info!(feeds = ?pollers.feed_names(), "feeds configured");
    pollers
}

pub fn apply_startup(controller: &mut Controller, settings: &config::Settings) {
    controller.tick();
    if settings.polling.autostart {
        controller.start_polling();
    }
}
