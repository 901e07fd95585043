//! Line commands read from stdin.

use std::io::{self, BufRead};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PlayPause,
    Next,
    Prev,
    Skip,
    GoStart,
    Select(String),
    OpenLink,
    ClearQueue,
    ClearTemp,
    Polling(bool),
    Volume(f32),
    /// `true` downloads and plays locally; `false` opens links externally.
    Acquire(bool),
    Token { feed: String, token: String },
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".to_string());
    };
    let arg = words.next();

    let cmd = match (verb, arg) {
        ("play" | "p", None) => Command::PlayPause,
        ("next" | "n", None) => Command::Next,
        ("prev", None) => Command::Prev,
        ("skip", None) => Command::Skip,
        ("start" | "gg", None) => Command::GoStart,
        ("select", Some(id)) => Command::Select(id.to_string()),
        ("open", None) => Command::OpenLink,
        ("clear", None) => Command::ClearQueue,
        ("clear-temp", None) => Command::ClearTemp,
        ("poll", Some("on")) => Command::Polling(true),
        ("poll", Some("off")) => Command::Polling(false),
        ("vol", Some(v)) => {
            let v: f32 = v.parse().map_err(|_| format!("bad volume: {v}"))?;
            if !(0.0..=1.0).contains(&v) {
                return Err(format!("volume must be within 0..1, got {v}"));
            }
            Command::Volume(v)
        }
        ("mode", Some("download")) => Command::Acquire(true),
        ("mode", Some("external")) => Command::Acquire(false),
        ("token", Some(feed)) => {
            let token = words.by_ref().collect::<Vec<_>>().join(" ");
            Command::Token {
                feed: feed.to_string(),
                token,
            }
        }
        ("quit" | "q", None) => Command::Quit,
        _ => return Err(format!("unknown command: {}", line.trim())),
    };

    if verb != "token" && words.next().is_some() {
        return Err(format!("unexpected arguments: {}", line.trim()));
    }
    Ok(cmd)
}

/// Read commands from stdin until EOF. Bad lines are logged and skipped.
pub fn spawn_stdin_reader(tx: Sender<Command>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(cmd) => {
                        if tx.send(cmd).is_err() {
                            break;
                        }
                    }
                    Err(msg) => warn!("{msg}"),
                }
            }
            debug!("stdin closed");
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation_and_aliases() {
        assert_eq!(parse_command("play"), Ok(Command::PlayPause));
        assert_eq!(parse_command("  next "), Ok(Command::Next));
        assert_eq!(parse_command("gg"), Ok(Command::GoStart));
        assert_eq!(parse_command("start"), Ok(Command::GoStart));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
        assert_eq!(
            parse_command("select DA:42"),
            Ok(Command::Select("DA:42".into()))
        );
    }

    #[test]
    fn parses_settings_commands() {
        assert_eq!(parse_command("poll on"), Ok(Command::Polling(true)));
        assert_eq!(parse_command("poll off"), Ok(Command::Polling(false)));
        assert_eq!(parse_command("vol 0.25"), Ok(Command::Volume(0.25)));
        assert_eq!(parse_command("mode external"), Ok(Command::Acquire(false)));
        assert_eq!(
            parse_command("token DX abc def"),
            Ok(Command::Token {
                feed: "DX".into(),
                token: "abc def".into()
            })
        );
        assert_eq!(
            parse_command("token DX"),
            Ok(Command::Token {
                feed: "DX".into(),
                token: String::new()
            })
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_command("").is_err());
        assert!(parse_command("vol loud").is_err());
        assert!(parse_command("vol 1.5").is_err());
        assert!(parse_command("poll maybe").is_err());
        assert!(parse_command("next please").is_err());
        assert!(parse_command("select").is_err());
        assert!(parse_command("dance").is_err());
    }
}
