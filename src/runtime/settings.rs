use std::io;

use tracing::{info, warn};

use crate::config;

pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("feedplay: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Logging is not up yet.
            eprintln!("feedplay: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}

/// Write user-changed settings back to the config file. Failures are logged
/// and otherwise ignored.
pub fn persist_settings(settings: &config::Settings) {
    let result = match config::resolve_config_path() {
        Some(path) => settings.save(&path).map(|()| path),
        None => Err(io::Error::new(
            io::ErrorKind::NotFound,
            "no config location (HOME unset)",
        )),
    };
    match result {
        Ok(path) => info!("settings saved to {}", path.display()),
        Err(e) => warn!("settings not saved: {e}"),
    }
}
