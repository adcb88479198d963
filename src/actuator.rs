//! Actuator interface
//!
//! The actuator is the external capability that performs real
//! keyboard/mouse effects. The engine only ever talks to this trait;
//! the concrete injection backend lives with the embedder.
//!
//! Implementations must be Send + Sync for use in async contexts.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// An injection call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuatorError {
    /// A single injection was rejected. Reported, run continues.
    #[error("input injection rejected: {0}")]
    Rejected(String),

    /// The actuator itself is gone (device detached, permission
    /// revoked). Structural: the run aborts.
    #[error("actuator unavailable: {0}")]
    Unavailable(String),
}

impl ActuatorError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ActuatorError::Unavailable(_))
    }
}

/// The injection capability consumed by the execution engine.
#[async_trait]
pub trait Actuator: Send + Sync {
    async fn press_key(&self, key: &str) -> Result<(), ActuatorError>;

    async fn release_key(&self, key: &str) -> Result<(), ActuatorError>;

    async fn type_text(&self, text: &str) -> Result<(), ActuatorError>;

    async fn click(&self, x: i32, y: i32) -> Result<(), ActuatorError>;

    async fn move_to(&self, x: i32, y: i32) -> Result<(), ActuatorError>;

    async fn scroll(&self, dx: i32, dy: i32) -> Result<(), ActuatorError>;

    /// Suspend for the given duration. Also carries the configured
    /// initial/inter-command/final delays, so mocks can observe them.
    async fn sleep(&self, duration: Duration);
}

/// Actuator that logs every call and performs nothing.
///
/// Lets the CLI run a macro end to end (real delays included) without
/// an injection backend wired in.
#[derive(Debug, Default)]
pub struct NullActuator;

#[async_trait]
impl Actuator for NullActuator {
    async fn press_key(&self, key: &str) -> Result<(), ActuatorError> {
        debug!(key, "press key");
        Ok(())
    }

    async fn release_key(&self, key: &str) -> Result<(), ActuatorError> {
        debug!(key, "release key");
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), ActuatorError> {
        debug!(text, "type text");
        Ok(())
    }

    async fn click(&self, x: i32, y: i32) -> Result<(), ActuatorError> {
        debug!(x, y, "click");
        Ok(())
    }

    async fn move_to(&self, x: i32, y: i32) -> Result<(), ActuatorError> {
        debug!(x, y, "move");
        Ok(())
    }

    async fn scroll(&self, dx: i32, dy: i32) -> Result<(), ActuatorError> {
        debug!(dx, dy, "scroll");
        Ok(())
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
