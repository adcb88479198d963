//! Recording sessions
//!
//! Turns captured keyboard/mouse events into instruction-prefix lines
//! the tokenizer accepts. The raw capture subsystem is external; it
//! feeds events (with wall-clock timestamps) into a session, and
//! `stop()` yields the finished instruction stream.
//!
//! A session is an explicit object with its own lifecycle - there are
//! no ambient recording flags. Dropping a session discards it.

use chrono::{DateTime, Utc};

/// A key as the capture subsystem reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedKey {
    Ctrl,
    Alt,
    Shift,
    Enter,
    Space,
    Backspace,
    Tab,
    /// A printable character key.
    Char(char),
    /// Any other key, by backend name (e.g. `f5`, `esc`).
    Named(String),
}

impl CapturedKey {
    fn name(&self) -> String {
        match self {
            CapturedKey::Ctrl => "CTRL".to_string(),
            CapturedKey::Alt => "ALT".to_string(),
            CapturedKey::Shift => "SHIFT".to_string(),
            CapturedKey::Enter => "ENTER".to_string(),
            CapturedKey::Space => "SPACE".to_string(),
            CapturedKey::Backspace => "BACKSPACE".to_string(),
            CapturedKey::Tab => "TAB".to_string(),
            CapturedKey::Char(c) => c.to_string(),
            CapturedKey::Named(name) => name.to_uppercase(),
        }
    }

    /// Only modifier releases are worth recording; everything else is
    /// replayed as a tap or typed text.
    fn is_modifier(&self) -> bool {
        matches!(self, CapturedKey::Ctrl | CapturedKey::Alt | CapturedKey::Shift)
    }
}

#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Insert a `DELAY:` line before each event from the gap since the
    /// previous one, so playback keeps the recorded pacing.
    pub record_delays: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self { record_delays: true }
    }
}

/// One recording session, from `start` to `stop`.
#[derive(Debug)]
pub struct RecorderSession {
    config: RecorderConfig,
    lines: Vec<String>,
    last_event: Option<DateTime<Utc>>,
}

impl RecorderSession {
    pub fn start(config: RecorderConfig) -> Self {
        Self {
            config,
            lines: Vec::new(),
            last_event: None,
        }
    }

    pub fn key_pressed(&mut self, key: &CapturedKey, at: DateTime<Utc>) {
        self.note_delay(at);
        self.lines.push(format!("KEY:{}", key.name()));
    }

    pub fn key_released(&mut self, key: &CapturedKey, _at: DateTime<Utc>) {
        if key.is_modifier() {
            self.lines.push(format!("KEYUP:{}", key.name()));
        }
    }

    pub fn mouse_clicked(&mut self, x: i32, y: i32, at: DateTime<Utc>) {
        self.note_delay(at);
        self.lines.push(format!("MOUSE_CLICK:{},{}", x, y));
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Terminate the session and take the instruction stream.
    pub fn stop(self) -> Vec<String> {
        self.lines
    }

    fn note_delay(&mut self, at: DateTime<Utc>) {
        if self.config.record_delays {
            if let Some(last) = self.last_event {
                let millis = (at - last).num_microseconds().unwrap_or(0) as f64 / 1000.0;
                if millis > 0.0 {
                    self.lines.push(format!("DELAY:{:.3}", millis));
                }
            }
        }
        self.last_event = Some(at);
    }
}
