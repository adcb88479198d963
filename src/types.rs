//! Shared data types

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::actuator::ActuatorError;
use crate::script::ScriptError;

/// A saved macro, as the record store keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroRecord {
    pub id: i64,
    pub description: String,
    pub commands: String,
}

/// Delay schedule for a run, in milliseconds.
///
/// Defaults match the tool's stock settings: one second before the
/// first instruction, half a second between commands, one second after
/// the last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub initial_delay_ms: u64,
    pub command_delay_ms: u64,
    pub post_delay_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            command_delay_ms: 500,
            post_delay_ms: 1000,
        }
    }
}

impl RunConfig {
    /// All-zero delays, for tests and embedders that pace themselves.
    pub fn immediate() -> Self {
        Self {
            initial_delay_ms: 0,
            command_delay_ms: 0,
            post_delay_ms: 0,
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn command_delay(&self) -> Duration {
        Duration::from_millis(self.command_delay_ms)
    }

    pub fn post_delay(&self) -> Duration {
        Duration::from_millis(self.post_delay_ms)
    }
}

/// Progress feedback: instructions executed so far against the
/// program length. `executed` can exceed `total` when loops replay
/// their bodies; observers should clamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub executed: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        ((self.executed as f64 / self.total as f64) * 100.0).min(100.0)
    }
}

/// A non-fatal failure reported at an instruction boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunWarning {
    Actuator { index: usize, error: ActuatorError },
    Script { index: usize, error: ScriptError },
}

/// What a finished (or cancelled) run looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub executed: usize,
    pub total: usize,
    pub cancelled: bool,
    pub warnings: Vec<RunWarning>,
}
