//! Events flowing from background loops into the controller.
//!
//! Every poller and the acquisition worker hold a cloned `EventSender`; the
//! controller owns the single `EventReceiver` and drains it without blocking.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::queue::{Status, Track};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A human-readable line for the log collaborator.
    Log(String),
    /// A feed reported a track for the first time (as far as it knows).
    NewTrack(Track),
    /// Move a track forward in its lifecycle.
    StatusUpdate {
        id: String,
        status: Status,
        error: Option<String>,
    },
    /// A local artifact was materialized for a track.
    DownloadDone { id: String, path: PathBuf },
}

pub type EventSender = Sender<Event>;
pub type EventReceiver = Receiver<Event>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::channel::<Event>()
}

/// Take every event currently queued, in arrival order.
pub fn drain(rx: &EventReceiver) -> Vec<Event> {
    rx.try_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn drain_returns_pending_events_in_order_without_blocking() {
        let (tx, rx) = channel();
        assert!(drain(&rx).is_empty());

        tx.send(Event::Log("one".into())).unwrap();
        tx.send(Event::Log("two".into())).unwrap();
        assert_eq!(
            drain(&rx),
            vec![Event::Log("one".into()), Event::Log("two".into())]
        );
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn many_producers_feed_one_consumer() {
        let (tx, rx) = channel();
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        tx.send(Event::Log(format!("{n}-{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(drain(&rx).len(), 100);
    }
}
