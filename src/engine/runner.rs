//! The macro run loop
//!
//! Drives the unified interpreter with execution semantics and
//! performs each side effect against the actuator. Suspension points
//! are the configured delays and the script-sink call; all control
//! flow bookkeeping is synchronous.
//!
//! Cancellation is cooperative: the token is checked before each step
//! and never mid-instruction, so an in-flight key combo always
//! finishes its release sequence and no modifier is left held down.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::EngineError;
use crate::actuator::{Actuator, ActuatorError};
use crate::interpreter::{Event, Interpreter, LoopMode, MacroProgram, SideEffect, Step};
use crate::script::ScriptSink;
use crate::types::{Progress, RunConfig, RunReport, RunWarning};

pub(crate) async fn run_macro(
    program: MacroProgram,
    actuator: Arc<dyn Actuator>,
    scripts: Arc<dyn ScriptSink>,
    config: RunConfig,
    cancel: CancellationToken,
    progress: watch::Sender<Progress>,
) -> Result<RunReport, EngineError> {
    let mut interpreter = Interpreter::new(program, LoopMode::Replay);
    let total = interpreter.total();
    let mut warnings = Vec::new();
    let mut cancelled = false;

    actuator.sleep(config.initial_delay()).await;

    loop {
        if cancel.is_cancelled() {
            debug!("cancellation requested, stopping run");
            cancelled = true;
            break;
        }

        let index = interpreter.pc();
        let event = match interpreter.step()? {
            Step::Done => break,
            Step::Event(event) => event,
        };

        match event {
            Event::Effect(effect) => {
                if let Some(warning) =
                    perform(&effect, index, actuator.as_ref(), scripts.as_ref()).await?
                {
                    warnings.push(warning);
                }
                actuator.sleep(config.command_delay()).await;
            }
            other => debug!(event = ?other, "control step"),
        }

        progress.send_replace(Progress {
            executed: interpreter.executed(),
            total,
        });
    }

    if !cancelled {
        actuator.sleep(config.post_delay()).await;
    }

    Ok(RunReport {
        executed: interpreter.executed(),
        total,
        cancelled,
        warnings,
    })
}

/// Perform one side effect.
///
/// A rejected injection or a script failure becomes a warning and the
/// run continues; an unavailable actuator aborts the run.
async fn perform(
    effect: &SideEffect,
    index: usize,
    actuator: &dyn Actuator,
    scripts: &dyn ScriptSink,
) -> Result<Option<RunWarning>, EngineError> {
    let result = match effect {
        SideEffect::KeyPress { key } => press_named_key(actuator, key).await,
        SideEffect::KeyRelease { key } => release_named_key(actuator, key).await,
        SideEffect::KeyCombo { keys } => press_combo(actuator, keys).await,
        SideEffect::MouseClick { x, y } => actuator.click(*x, *y).await,
        SideEffect::MouseMove { x, y } => actuator.move_to(*x, *y).await,
        SideEffect::MouseScroll { dx, dy } => actuator.scroll(*dx, *dy).await,
        SideEffect::Delay { millis } => {
            actuator
                .sleep(Duration::from_secs_f64(millis / 1000.0))
                .await;
            Ok(())
        }
        SideEffect::WriteText { text } => actuator.type_text(text).await,
        SideEffect::WriteVariable { value, .. } => actuator.type_text(value).await,
        SideEffect::Script { source } => {
            return match scripts.run(source).await {
                Ok(()) => Ok(None),
                Err(error) => {
                    warn!(%error, index, "script block failed, continuing");
                    Ok(Some(RunWarning::Script { index, error }))
                }
            };
        }
    };

    match result {
        Ok(()) => Ok(None),
        Err(error) if error.is_fatal() => Err(EngineError::Actuator(error)),
        Err(error) => {
            warn!(%error, index, "actuator call failed, continuing");
            Ok(Some(RunWarning::Actuator { index, error }))
        }
    }
}

/// `KEY:` semantics: modifiers press and hold, the named keys tap,
/// anything else is typed as literal text. Recorded streams contain
/// `KEY:<char>` lines with no matching `KEYUP:`, so holding every key
/// would wedge the keyboard.
async fn press_named_key(actuator: &dyn Actuator, key: &str) -> Result<(), ActuatorError> {
    match key {
        "CTRL" | "ALT" | "SHIFT" => actuator.press_key(&key.to_lowercase()).await,
        "ENTER" | "SPACE" | "BACKSPACE" | "TAB" => {
            let name = key.to_lowercase();
            actuator.press_key(&name).await?;
            actuator.release_key(&name).await
        }
        _ => actuator.type_text(key).await,
    }
}

/// `KEYUP:` releases modifiers only; anything else has nothing held.
async fn release_named_key(actuator: &dyn Actuator, key: &str) -> Result<(), ActuatorError> {
    match key {
        "CTRL" | "ALT" | "SHIFT" => actuator.release_key(&key.to_lowercase()).await,
        _ => {
            debug!(key, "ignoring release of non-modifier key");
            Ok(())
        }
    }
}

/// Press every key in order, release in reverse order.
///
/// The full sequence always completes, even on failure, so no key is
/// left held; the first error is reported afterwards.
async fn press_combo(actuator: &dyn Actuator, keys: &[String]) -> Result<(), ActuatorError> {
    let mut first_error = None;

    for key in keys {
        if let Err(error) = actuator.press_key(&key.to_lowercase()).await {
            first_error.get_or_insert(error);
        }
    }
    for key in keys.iter().rev() {
        if let Err(error) = actuator.release_key(&key.to_lowercase()).await {
            first_error.get_or_insert(error);
        }
    }

    match first_error {
        None => Ok(()),
        Some(error) => Err(error),
    }
}
