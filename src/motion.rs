//! Reduced-motion preference: where the initial value comes from and how
//! live changes are observed.

use crossterm::event::{Event, KeyCode, KeyEventKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_VAR: &str = "REDUCE_MOTION";
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How live preference changes reach the fireworks view. Picked once by
/// [`MotionWatch::detect`]. An explicit `--reduced-motion` pins the value
/// against the file, so only the keyboard can lift it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotionWatch {
    /// Re-read a preference file on a timer.
    File { path: PathBuf },
    /// `m` toggles the preference.
    Keyboard,
    /// Initial value for the whole session.
    Fixed,
}

impl MotionWatch {
    pub fn detect(file: Option<&Path>, keyboard: bool, pinned: bool) -> Self {
        let watch = match file {
            Some(path) if !pinned => MotionWatch::File {
                path: path.to_path_buf(),
            },
            _ if keyboard => MotionWatch::Keyboard,
            _ => MotionWatch::Fixed,
        };
        tracing::debug!(?watch, pinned, "motion preference watch selected");
        watch
    }

    pub fn needs_polling(&self) -> bool {
        matches!(self, MotionWatch::File { .. })
    }

    /// Preference implied by a terminal event, given the current value.
    pub fn on_event(&self, event: &Event, current: bool) -> Option<bool> {
        let MotionWatch::Keyboard = self else {
            return None;
        };
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                KeyCode::Char('m') | KeyCode::Char('M') => Some(!current),
                _ => None,
            },
            _ => None,
        }
    }

    /// Current value of a file-backed preference. `None` when there is
    /// nothing to read.
    pub fn poll(&self) -> Option<bool> {
        match self {
            MotionWatch::File { path } => read_file(path),
            _ => None,
        }
    }
}

fn read_file(path: &Path) -> Option<bool> {
    fs::read_to_string(path)
        .ok()
        .map(|contents| contents.trim().eq_ignore_ascii_case("reduce"))
}

fn env_flag(value: Option<String>) -> bool {
    match value {
        Some(v) => {
            let v = v.trim();
            !(v.is_empty() || v == "0" || v.eq_ignore_ascii_case("false"))
        }
        None => false,
    }
}

/// Preference at startup: the flag, the environment, or the file.
pub fn initial(flag: bool, file: Option<&Path>) -> bool {
    flag || env_flag(std::env::var(ENV_VAR).ok()) || file.and_then(read_file).unwrap_or(false)
}
