use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use tracing::info;

use crate::acquire::{AcquisitionWorker, HttpFetcher, spawn_worker};
use crate::audio::RodioPlayback;
use crate::controller::{Controller, ControllerOptions, LogNotifier};
use crate::events;
use crate::opener::SystemOpener;
use crate::queue::TrackQueue;
use crate::store::Store;

mod event_loop;
mod input;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = settings::load_settings();
    startup::init_logging(&settings.log.filter);

    let store = Store::new(settings.storage.resolved_state_dir());
    let queue = TrackQueue::load(
        &store,
        settings.queue.limit,
        settings.queue.dedup_window_secs,
    );
    info!(tracks = queue.len(), state = %store.dir().display(), "queue restored");

    let (events_tx, events_rx) = events::channel();
    let pollers = startup::build_pollers(&settings, events_tx.clone(), store.clone());

    let mut controller = Controller::new(
        queue,
        store,
        events_rx,
        Box::new(RodioPlayback::open_default()),
        Box::new(SystemOpener),
        Box::new(LogNotifier),
        pollers,
        ControllerOptions::from_settings(&settings),
    );

    let fetcher = HttpFetcher::new(&settings.acquisition);
    info!(dir = %fetcher.dir().display(), "artifacts directory");
    let shutdown = Arc::new(AtomicBool::new(false));
    let worker = AcquisitionWorker::new(
        fetcher,
        controller.window_handle(),
        events_tx,
        Duration::from_millis(settings.acquisition.interval_ms),
        shutdown.clone(),
    );
    // The worker may be mid-download at quit; it is signalled, not joined.
    spawn_worker(worker)?;

    let (command_tx, command_rx) = mpsc::channel::<input::Command>();
    input::spawn_stdin_reader(command_tx)?;

    startup::apply_startup(&mut controller, &settings);

    event_loop::run(&mut controller, &mut settings, &command_rx);

    controller.close();
    info!(tracks = controller.queue().len(), "queue saved");
    shutdown.store(true, Ordering::Relaxed);
    Ok(())
}
