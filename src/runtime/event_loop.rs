use std::sync::mpsc::Receiver;
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::config;
use crate::controller::Controller;

use super::input::Command;
use super::settings::persist_settings;

/// Controller loop: apply pending commands, then tick. Returns on `Quit`.
pub fn run(
    controller: &mut Controller,
    settings: &mut config::Settings,
    commands: &Receiver<Command>,
) {
    let tick = Duration::from_millis(settings.runtime.tick_ms.max(1));
    while !controller.is_closing() {
        while let Ok(cmd) = commands.try_recv() {
            if handle_command(cmd, controller, settings) {
                return;
            }
        }
        controller.tick();
        thread::sleep(tick);
    }
}

/// Returns `true` when the app should shut down.
fn handle_command(
    cmd: Command,
    controller: &mut Controller,
    settings: &mut config::Settings,
) -> bool {
    match cmd {
        Command::Quit => {
            info!("quit requested");
            return true;
        }
        Command::PlayPause => controller.play_pause(),
        Command::Next => controller.next(false),
        Command::Prev => controller.prev(),
        Command::Skip => controller.skip(),
        Command::GoStart => controller.go_start(),
        Command::Select(id) => {
            if !controller.select(&id) {
                info!("no track {id}");
            }
        }
        Command::OpenLink => controller.open_current_link(),
        Command::ClearQueue => controller.clear_queue(),
        Command::ClearTemp => controller.clear_temp(),
        Command::Polling(true) => {
            if controller.start_polling() {
                info!(running = controller.pollers().is_running(), "polling requested");
            }
        }
        Command::Polling(false) => controller.stop_polling(),
        Command::Volume(v) => {
            controller.set_volume(v);
            settings.playback.volume = controller.options().volume;
            persist_settings(settings);
        }
        Command::Acquire(acquire) => {
            controller.set_acquire(acquire);
            settings.playback.acquire = acquire;
            persist_settings(settings);
        }
        Command::Token { feed, token } => {
            if controller.set_token(&feed, &token) {
                if let Some(entry) = settings.feeds.iter_mut().find(|f| f.name == feed) {
                    entry.token = token;
                }
                persist_settings(settings);
            }
        }
    }
    false
}
