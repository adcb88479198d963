//! Test doubles for engine tests
//!
//! A recording actuator and script sink. The actuator can be told to
//! reject or lose a key, to trip a cancellation token when a key goes
//! down (for deterministic mid-run cancellation), and to gate its
//! sleeps on a semaphore (for holding a run open).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::actuator::{Actuator, ActuatorError};
use crate::script::{ScriptError, ScriptSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Press(String),
    Release(String),
    Type(String),
    Click(i32, i32),
    Move(i32, i32),
    Scroll(i32, i32),
    Sleep(Duration),
}

#[derive(Default)]
pub struct MockActuator {
    calls: Mutex<Vec<Call>>,
    reject_press_of: Option<String>,
    unavailable_on_press_of: Option<String>,
    cancel_on_press_of: Mutex<Option<(String, CancellationToken)>>,
    sleep_gate: Option<Arc<Semaphore>>,
}

impl MockActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject one key's press with a non-fatal error.
    pub fn reject_press_of(mut self, key: &str) -> Self {
        self.reject_press_of = Some(key.to_string());
        self
    }

    /// Fail one key's press as if the device went away.
    pub fn unavailable_on_press_of(mut self, key: &str) -> Self {
        self.unavailable_on_press_of = Some(key.to_string());
        self
    }

    /// Block every sleep on the semaphore.
    pub fn gated_sleep(mut self, gate: Arc<Semaphore>) -> Self {
        self.sleep_gate = Some(gate);
        self
    }

    /// Trip the token when `key` goes down. Set after `Engine::start`
    /// so the run's own token can be wired in.
    pub fn set_cancel_on_press(&self, key: &str, token: CancellationToken) {
        *self.cancel_on_press_of.lock().unwrap() = Some((key.to_string(), token));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn presses(&self) -> Vec<String> {
        self.filtered(|call| match call {
            Call::Press(key) => Some(key.clone()),
            _ => None,
        })
    }

    pub fn releases(&self) -> Vec<String> {
        self.filtered(|call| match call {
            Call::Release(key) => Some(key.clone()),
            _ => None,
        })
    }

    pub fn typed(&self) -> Vec<String> {
        self.filtered(|call| match call {
            Call::Type(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.filtered(|call| match call {
            Call::Sleep(duration) => Some(*duration),
            _ => None,
        })
    }

    fn filtered<T>(&self, f: impl Fn(&Call) -> Option<T>) -> Vec<T> {
        self.calls.lock().unwrap().iter().filter_map(f).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Actuator for MockActuator {
    async fn press_key(&self, key: &str) -> Result<(), ActuatorError> {
        self.record(Call::Press(key.to_string()));

        if let Some((trigger, token)) = self.cancel_on_press_of.lock().unwrap().as_ref() {
            if trigger == key {
                token.cancel();
            }
        }
        if self.unavailable_on_press_of.as_deref() == Some(key) {
            return Err(ActuatorError::Unavailable("injection device detached".into()));
        }
        if self.reject_press_of.as_deref() == Some(key) {
            return Err(ActuatorError::Rejected(format!("press of {} refused", key)));
        }
        Ok(())
    }

    async fn release_key(&self, key: &str) -> Result<(), ActuatorError> {
        self.record(Call::Release(key.to_string()));
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), ActuatorError> {
        self.record(Call::Type(text.to_string()));
        Ok(())
    }

    async fn click(&self, x: i32, y: i32) -> Result<(), ActuatorError> {
        self.record(Call::Click(x, y));
        Ok(())
    }

    async fn move_to(&self, x: i32, y: i32) -> Result<(), ActuatorError> {
        self.record(Call::Move(x, y));
        Ok(())
    }

    async fn scroll(&self, dx: i32, dy: i32) -> Result<(), ActuatorError> {
        self.record(Call::Scroll(dx, dy));
        Ok(())
    }

    async fn sleep(&self, duration: Duration) {
        self.record(Call::Sleep(duration));
        if let Some(gate) = &self.sleep_gate {
            gate.acquire().await.expect("sleep gate closed").forget();
        }
    }
}

/// Script sink that records sources and optionally fails every call.
#[derive(Default)]
pub struct RecordingScriptSink {
    pub sources: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingScriptSink {
    pub fn failing() -> Self {
        Self {
            sources: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl ScriptSink for RecordingScriptSink {
    async fn run(&self, source: &str) -> Result<(), ScriptError> {
        self.sources.lock().unwrap().push(source.to_string());
        if self.fail {
            return Err(ScriptError("interpreter raised".into()));
        }
        Ok(())
    }
}
