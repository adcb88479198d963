//! Script sink interface
//!
//! `SCRIPT:` blocks are opaque to the macro grammar; they are handed
//! to this sink and whatever happens there stays there. A sink failure
//! is isolated to that single instruction - the run continues.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// The embedded script runner raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("script failed: {0}")]
pub struct ScriptError(pub String);

/// Consumer of `SCRIPT:` blocks.
#[async_trait]
pub trait ScriptSink: Send + Sync {
    async fn run(&self, source: &str) -> Result<(), ScriptError>;
}

/// Sink that logs the block and does nothing.
#[derive(Debug, Default)]
pub struct NoopScriptSink;

#[async_trait]
impl ScriptSink for NoopScriptSink {
    async fn run(&self, source: &str) -> Result<(), ScriptError> {
        debug!(source, "script block ignored (no sink configured)");
        Ok(())
    }
}
