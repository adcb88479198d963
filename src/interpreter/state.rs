//! Interpreter runtime state
//!
//! The state is owned exclusively by one interpreter instance during
//! its run: created fresh per run, discarded at run end or
//! cancellation. Nothing survives between runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A loop being executed.
///
/// `total` is kept alongside `remaining` so iteration events can be
/// announced as `k/n` without rescanning the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopFrame {
    pub remaining: u32,
    pub total: u32,
    pub body_start: usize,
}

/// Mutable interpreter state: variable bindings, loop stack,
/// condition stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeState {
    pub variables: HashMap<String, String>,
    pub loop_stack: Vec<LoopFrame>,
    pub condition_stack: Vec<bool>,
}

impl RuntimeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A missing variable never raises; it resolves to empty text.
    pub fn variable(&self, name: &str) -> &str {
        self.variables.get(name).map(String::as_str).unwrap_or("")
    }

    /// True while the innermost open conditional is false.
    pub fn in_skipped_branch(&self) -> bool {
        self.condition_stack.last() == Some(&false)
    }
}
