//! Execution engine
//!
//! The engine runs a validated program as a single cancellable
//! background task. The actuator is a process-wide shared resource
//! (the keyboard/mouse injection target), so exactly one run may be
//! active at a time: a second start request is rejected, never queued.

pub mod runner;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::actuator::{Actuator, ActuatorError};
use crate::interpreter::{validate, MacroProgram, StepError, SyntaxError};
use crate::script::ScriptSink;
use crate::types::{Progress, RunConfig, RunReport};

/// Why a run could not start or finish.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("a macro run is already in progress")]
    AlreadyRunning,

    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    Actuator(#[from] ActuatorError),

    #[error("macro task failed: {0}")]
    TaskFailed(String),
}

/// The engine service. Owns the actuator and script sink and enforces
/// the one-active-run rule.
pub struct Engine {
    actuator: Arc<dyn Actuator>,
    scripts: Arc<dyn ScriptSink>,
    active: Arc<AtomicBool>,
}

impl Engine {
    pub fn new(actuator: Arc<dyn Actuator>, scripts: Arc<dyn ScriptSink>) -> Self {
        Self {
            actuator,
            scripts,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Validate the program and start it as a background run.
    ///
    /// Fails fast on a structural error - no partial side effects -
    /// and with [`EngineError::AlreadyRunning`] while another run
    /// holds the actuator.
    pub fn start(
        &self,
        program: MacroProgram,
        config: RunConfig,
    ) -> Result<RunHandle, EngineError> {
        validate(&program)?;

        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EngineError::AlreadyRunning);
        }

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let (progress_tx, progress_rx) = watch::channel(Progress {
            executed: 0,
            total: program.len(),
        });

        // Bind everything the task captures by value, up front
        let slot = ActiveSlot(Arc::clone(&self.active));
        let actuator = Arc::clone(&self.actuator);
        let scripts = Arc::clone(&self.scripts);
        let run_cancel = cancel.clone();

        info!(run_id = %id, total = program.len(), "starting macro run");
        let task = tokio::spawn(async move {
            let report =
                runner::run_macro(program, actuator, scripts, config, run_cancel, progress_tx)
                    .await;
            drop(slot);
            report
        });

        Ok(RunHandle {
            id,
            cancel,
            progress: progress_rx,
            task,
        })
    }
}

/// Releases the single-run slot when the run task ends, even if the
/// task unwinds.
struct ActiveSlot(Arc<AtomicBool>);

impl Drop for ActiveSlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A started run: cancel it, watch its progress, await its report.
pub struct RunHandle {
    pub id: Uuid,
    cancel: CancellationToken,
    progress: watch::Receiver<Progress>,
    task: JoinHandle<Result<RunReport, EngineError>>,
}

impl RunHandle {
    /// Request a cooperative stop. Takes effect between instruction
    /// steps; cancellation is a clean stop, not an error.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token clone for wiring external cancel triggers (e.g. ctrl-c).
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Progress side channel. Updates may trail cancellation; a stale
    /// update after a cancel must be tolerated.
    pub fn progress(&self) -> watch::Receiver<Progress> {
        self.progress.clone()
    }

    /// Wait for the run to finish and take its report.
    pub async fn wait(self) -> Result<RunReport, EngineError> {
        match self.task.await {
            Ok(result) => result,
            Err(join_error) => Err(EngineError::TaskFailed(join_error.to_string())),
        }
    }
}
