use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then environment variables
/// (prefix `FEEDPLAY__`) on top, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("FEEDPLAY")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.queue.limit == 0 {
            return Err("queue.limit must be >= 1".to_string());
        }
        if self.polling.interval_secs == 0 {
            return Err("polling.interval_secs must be >= 1".to_string());
        }
        if self.acquisition.interval_ms == 0 {
            return Err("acquisition.interval_ms must be >= 1".to_string());
        }
        if self.runtime.tick_ms == 0 {
            return Err("runtime.tick_ms must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err("playback.volume must be within 0.0..=1.0".to_string());
        }
        if self.queue.dedup_window_secs < 0.0 {
            return Err("queue.dedup_window_secs must not be negative".to_string());
        }

        let mut seen = HashSet::new();
        for feed in &self.feeds {
            let name = feed.name.trim();
            if name.is_empty() {
                return Err("feeds[].name must not be blank".to_string());
            }
            if !seen.insert(name) {
                return Err(format!("feed name '{name}' is used twice"));
            }
        }
        Ok(())
    }

    /// Write the settings back as TOML.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)
    }
}

/// Resolve the config path from `FEEDPLAY_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("FEEDPLAY_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/feedplay/config.toml`
/// or `~/.config/feedplay/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("feedplay").join("config.toml"))
}
