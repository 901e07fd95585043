//! Background polling loops, one thread per feed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::events::{Event, EventSender};
use crate::store::Store;

use super::types::{Cursor, CursorState, FeedSource, cursor_key};

/// Latest credential for a feed; replaced at runtime without a restart.
pub type TokenHandle = Arc<Mutex<String>>;
/// Latest watermark for a feed; written only by that feed's poller.
pub type CursorHandle = Arc<Mutex<Option<Cursor>>>;

/// One feed's polling loop.
pub struct Poller {
    source: Arc<dyn FeedSource>,
    token: TokenHandle,
    cursor: CursorHandle,
    events: EventSender,
    store: Store,
    interval: Duration,
    stop: Arc<AtomicBool>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn FeedSource>,
        token: TokenHandle,
        cursor: CursorHandle,
        events: EventSender,
        store: Store,
        interval: Duration,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            token,
            cursor,
            events,
            store,
            interval,
            stop,
        }
    }

    /// Poll until the stop flag is raised. The flag is only checked between
    /// cycles.
    pub fn run(self) {
        while !self.stop.load(Ordering::Relaxed) {
            self.poll_once();
            thread::sleep(self.interval);
        }
        debug!(feed = self.source.name(), "poller stopped");
    }

    /// One fetch cycle. Returns how many tracks were emitted.
    pub fn poll_once(&self) -> usize {
        let name = self.source.name();
        let token = self
            .token
            .lock()
            .map(|t| t.trim().to_string())
            .unwrap_or_default();
        if token.is_empty() {
            return 0;
        }
        let since = self.cursor.lock().ok().and_then(|c| *c);

        let items = match self.source.fetch_new(&token, since) {
            Ok(items) => items,
            Err(e) => {
                warn!(feed = name, "poll failed: {e}");
                let _ = self.events.send(Event::Log(format!("{name} error: {e}")));
                return 0;
            }
        };

        let mut latest = since;
        let mut emitted = 0;
        for item in items {
            if since.is_some_and(|c| !item.cursor.is_after(&c)) {
                continue;
            }
            latest = Some(Cursor::advance(latest, item.cursor));
            if self.events.send(Event::NewTrack(item.into_track(name))).is_err() {
                break;
            }
            emitted += 1;
        }

        if latest != since {
            if let Ok(mut c) = self.cursor.lock() {
                *c = latest;
            }
            let state = CursorState { cursor: latest };
            if let Err(e) = self.store.save(&cursor_key(name), &state) {
                debug!(feed = name, "cursor not saved: {e}");
            }
        }
        emitted
    }
}

struct FeedSlot {
    source: Arc<dyn FeedSource>,
    token: TokenHandle,
    cursor: CursorHandle,
}

/// The set of configured feeds and their running loops.
///
/// Every `start` hands its loops a fresh stop flag, so a loop left over from
/// an earlier start (still sleeping out its interval) exits on its own flag
/// instead of being revived.
pub struct Pollers {
    slots: Vec<FeedSlot>,
    events: EventSender,
    store: Store,
    interval: Duration,
    stop: Option<Arc<AtomicBool>>,
}

impl Pollers {
    pub fn new(events: EventSender, store: Store, interval: Duration) -> Self {
        Self {
            slots: Vec::new(),
            events,
            store,
            interval,
            stop: None,
        }
    }

    /// Register a feed; its cursor is restored from the store.
    pub fn add_feed(&mut self, source: Arc<dyn FeedSource>, token: impl Into<String>) {
        let state: CursorState = self.store.load_or_default(&cursor_key(source.name()));
        self.slots.push(FeedSlot {
            source,
            token: Arc::new(Mutex::new(token.into().trim().to_string())),
            cursor: Arc::new(Mutex::new(state.cursor)),
        });
    }

    pub fn feed_names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.source.name().to_string()).collect()
    }

    /// Whether any feed has a non-blank token.
    pub fn has_tokens(&self) -> bool {
        self.slots.iter().any(|s| !read_token(&s.token).is_empty())
    }

    /// Replace `feed`'s token. Running loops see it on their next cycle.
    pub fn set_token(&self, feed: &str, token: &str) -> bool {
        let Some(slot) = self.slots.iter().find(|s| s.source.name() == feed) else {
            return false;
        };
        if let Ok(mut t) = slot.token.lock() {
            *t = token.trim().to_string();
        }
        true
    }

    pub fn cursor(&self, feed: &str) -> Option<Cursor> {
        self.slots
            .iter()
            .find(|s| s.source.name() == feed)
            .and_then(|s| s.cursor.lock().ok().and_then(|c| *c))
    }

    /// Spawn a loop for every feed with a token. Feeds without one are
    /// skipped until the next start. Returns the number of loops started.
    pub fn start(&mut self) -> usize {
        self.stop();
        let flag = Arc::new(AtomicBool::new(false));
        let mut started = 0;

        for slot in &self.slots {
            let name = slot.source.name().to_string();
            if read_token(&slot.token).is_empty() {
                info!(feed = %name, "no token, not polling");
                continue;
            }
            let poller = Poller::new(
                slot.source.clone(),
                slot.token.clone(),
                slot.cursor.clone(),
                self.events.clone(),
                self.store.clone(),
                self.interval,
                flag.clone(),
            );
            match thread::Builder::new()
                .name(format!("poll-{name}"))
                .spawn(move || poller.run())
            {
                Ok(_) => started += 1,
                Err(e) => warn!(feed = %name, "could not spawn poller: {e}"),
            }
        }

        if started > 0 {
            self.stop = Some(flag);
        }
        started
    }

    pub fn stop(&mut self) {
        if let Some(flag) = self.stop.take() {
            flag.store(true, Ordering::Relaxed);
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| !flag.load(Ordering::Relaxed))
    }

    /// Write every known cursor to the store; failures are ignored.
    pub fn save_cursors(&self) {
        for slot in &self.slots {
            let state = CursorState {
                cursor: slot.cursor.lock().ok().and_then(|c| *c),
            };
            let name = slot.source.name();
            if let Err(e) = self.store.save(&cursor_key(name), &state) {
                debug!(feed = name, "cursor not saved: {e}");
            }
        }
    }
}

fn read_token(token: &TokenHandle) -> String {
    token.lock().map(|t| t.trim().to_string()).unwrap_or_default()
}
